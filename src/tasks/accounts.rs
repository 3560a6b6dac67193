//! The `accounts` task: print every signer address, one per line.

use std::io::Write;

use futures_util::StreamExt;

use crate::blockchain::signers::SignerProvider;
use crate::tasks::TaskError;

/// Stream the provider's addresses into `out` in provider order.
///
/// Returns the number of addresses written.
pub async fn accounts<W: Write>(
    signers: &dyn SignerProvider,
    out: &mut W,
) -> Result<usize, TaskError> {
    let mut addresses = signers.accounts();
    let mut count = 0;
    while let Some(address) = addresses.next().await {
        writeln!(out, "{}", address?)?;
        count += 1;
    }
    out.flush()?;
    tracing::debug!(count, "Accounts listed");
    Ok(count)
}
