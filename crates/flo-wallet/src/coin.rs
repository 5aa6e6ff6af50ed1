//! Spendable outputs and the policy that picks one.

use flo_rpc::UnspentOutput;
use flo_script::Script;

use crate::WalletError;

/// An output the wallet can spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Funding txid in display hex.
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    pub locking_script: Script,
    pub confirmations: u64,
}

impl TryFrom<&UnspentOutput> for Utxo {
    type Error = WalletError;

    fn try_from(out: &UnspentOutput) -> Result<Self, Self::Error> {
        let locking_script = Script::from_hex(&out.script_pub_key)
            .map_err(|e| WalletError::NoSpendableOutput(format!("{}:{}: {}", out.txid, out.vout, e)))?;
        Ok(Utxo {
            txid: out.txid.clone(),
            vout: out.vout,
            satoshis: out.satoshis(),
            locking_script,
            confirmations: out.confirmations,
        })
    }
}

/// Picks the output the wallet will keep rolling its change through.
pub trait CoinSelector {
    fn select(&self, candidates: &[Utxo]) -> Option<Utxo>;
}

/// The largest output; ties go to the deeper confirmation.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestFirst;

impl CoinSelector for LargestFirst {
    fn select(&self, candidates: &[Utxo]) -> Option<Utxo> {
        candidates
            .iter()
            .max_by_key(|u| (u.satoshis, u.confirmations))
            .cloned()
    }
}
