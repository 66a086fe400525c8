use std::ffi::OsString;

/// Rewrite single-dash long flags such as `-config path` or `-mode=set-key`
/// into the `--config` form clap expects.
///
/// Only the given `names` are rewritten, so short flags like `-c` are left
/// alone. Everything after a `--` terminator is passed through untouched.
pub fn long_flags<I, T>(args: I, names: &[&str]) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if terminated {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                terminated = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(flag) if !flag.starts_with('-') => {
                    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
                    if names.contains(&name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
