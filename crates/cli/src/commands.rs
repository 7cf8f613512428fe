use crate::cli::{CliError, GetArgs};
use crate::output::render;
use ::tracing::instrument;

/// Fetch one secret and write it to stdout
#[instrument(name = "get", skip_all, fields(secret_id = %args.secret_id))]
pub async fn execute_get(args: GetArgs) -> Result<(), CliError> {
    let options = args.to_options()?;
    ::tracing::debug!(?options, "Resolved lookup options");

    let value = get_aws_secret::get_secret(&args.secret_id, &options, None).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &args.secret_id, value, args.output)?;
    Ok(())
}
