use std::fmt::Debug;
use std::fmt::Display;

/// Print an error followed by every error in its `source` chain, one per line.
///
/// Meant for `Debug` impls, so that `tracing` fields like `error.cause_chain=?e`
/// show the whole story instead of just the outermost message.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}

/// Log a failure that is deliberately not propagated to the caller
pub fn log_best_effort<E>(
    what: &str,
    e: &E,
) where
    E: Debug + Display,
{
    tracing::error!(
        error.cause_chain=?e,
        error.message=%e,
        "{what} failed; continuing"
    );
}
