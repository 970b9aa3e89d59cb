/// Recommended error type for smoke-test orchestration code. This type is compatible with the
/// resource manager and client errors so you can use `?` to propagate them.
pub type ProbeResult<T> = anyhow::Result<T>;
