//! Bookkeeping for the wallet's chain of unconfirmed transactions.
//!
//! Every send spends the previous send's change, so the wallet's pending
//! transactions form one linear mempool chain. Nodes refuse to extend a
//! chain past their ancestor limits; the manager tracks the chain's
//! ancestor count and size, holds sends back while either is at its
//! ceiling, and asks a [`Repairer`] to rebroadcast when the chain stops
//! confirming.

use std::collections::VecDeque;

use flo_rpc::NodeRpc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::ChainLimits;
use crate::repair::Repairer;
use crate::WalletError;

/// Where the manager is in a send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    Sending,
    Throttled,
    Repairing,
}

pub struct MempoolChainManager<C> {
    limits: ChainLimits,
    clock: C,
    state: watch::Sender<ChainState>,
    ancestor_count: u64,
    ancestor_size: u64,
    /// Raw hex of the unconfirmed chain, oldest first.
    pending: VecDeque<String>,
    cancel: Option<CancellationToken>,
}

impl<C: Clock> MempoolChainManager<C> {
    pub fn new(limits: ChainLimits, clock: C) -> Self {
        MempoolChainManager {
            limits,
            clock,
            state: watch::Sender::new(ChainState::Idle),
            ancestor_count: 0,
            ancestor_size: 0,
            pending: VecDeque::new(),
            cancel: None,
        }
    }

    /// Abort throttled waits with `WalletError::Cancelled` once `token`
    /// fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> ChainState {
        *self.state.borrow()
    }

    /// Follow state changes, including while a send holds the manager.
    pub fn subscribe(&self) -> watch::Receiver<ChainState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: ChainState) {
        self.state.send_replace(state);
    }

    pub fn ancestor_count(&self) -> u64 {
        self.ancestor_count
    }

    pub fn ancestor_size(&self) -> u64 {
        self.ancestor_size
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn at_capacity(&self) -> bool {
        self.ancestor_count >= self.limits.max_ancestor_count
            || self.ancestor_size >= self.limits.max_ancestor_size
    }

    /// Account for a transaction just accepted by the node.
    pub fn record_send(&mut self, raw_hex: &str) {
        self.ancestor_count += 1;
        self.ancestor_size += (raw_hex.len() / 2) as u64;
        self.pending.push_back(raw_hex.to_string());
        self.set_state(ChainState::Idle);
        debug!(count = self.ancestor_count, size = self.ancestor_size, "recorded send");
    }

    /// Return to `Idle` after a send that did not reach the node.
    pub fn abandon_send(&mut self) {
        self.set_state(ChainState::Idle);
    }

    /// Wait until the chain has room for one more transaction.
    ///
    /// Returns at once below the ceilings. Otherwise polls the mempool
    /// entry of `tip_txid`, the newest transaction of the chain, until the
    /// node reports room or the tip confirms. Each `repair_after` without
    /// the count going down triggers one repair attempt.
    ///
    /// # Returns
    /// `ChainState` if the tip is neither in the mempool nor confirmed,
    /// `Cancelled` if the cancellation token fires, or an RPC error.
    pub async fn ensure_capacity<R, P>(
        &mut self,
        rpc: &R,
        tip_txid: &str,
        repairer: &P,
    ) -> Result<(), WalletError>
    where
        R: NodeRpc + Sync,
        P: Repairer + Sync,
    {
        self.set_state(ChainState::Sending);
        if !self.at_capacity() {
            return Ok(());
        }

        let count_before = self.ancestor_count;
        let started = self.clock.now();
        let mut last_progress = started;
        self.set_state(ChainState::Throttled);
        warn!(
            count = self.ancestor_count,
            size = self.ancestor_size,
            "mempool chain at its limit, throttling sends"
        );

        loop {
            let previous = self.ancestor_count;
            if let Err(e) = self.refresh(rpc, tip_txid).await {
                self.set_state(ChainState::Idle);
                return Err(e);
            }
            if self.ancestor_count < previous {
                last_progress = self.clock.now();
            }
            if !self.at_capacity() {
                break;
            }

            if self.clock.now().duration_since(last_progress) >= self.limits.repair_after() {
                self.run_repair(repairer).await;
                self.set_state(ChainState::Throttled);
                last_progress = self.clock.now();
            }
            if let Err(e) = self.pause().await {
                self.set_state(ChainState::Idle);
                return Err(e);
            }
        }

        let stalled = self.clock.now().duration_since(started);
        let confirmed = count_before.saturating_sub(self.ancestor_count);
        self.drop_confirmed(confirmed);
        info!(
            confirmed,
            count = self.ancestor_count,
            stalled_ms = stalled.as_millis() as u64,
            "mempool chain has room again"
        );

        if stalled >= self.limits.repair_after() && confirmed < count_before / 10 {
            self.run_repair(repairer).await;
        }
        self.set_state(ChainState::Sending);
        Ok(())
    }

    async fn refresh<R: NodeRpc + Sync>(&mut self, rpc: &R, tip_txid: &str) -> Result<(), WalletError> {
        match rpc.get_mempool_entry(tip_txid).await? {
            Some(entry) => {
                self.ancestor_count = entry.ancestor_count;
                self.ancestor_size = entry.ancestor_size;
            }
            None => {
                let info = rpc.get_raw_transaction_verbose(tip_txid).await?;
                if info.confirmations == 0 {
                    return Err(WalletError::ChainState(format!(
                        "{} is neither in the mempool nor confirmed",
                        tip_txid
                    )));
                }
                info!(tip = tip_txid, confirmations = info.confirmations, "chain cleared");
                self.ancestor_count = 0;
                self.ancestor_size = 0;
            }
        }
        Ok(())
    }

    async fn run_repair<P: Repairer + Sync>(&mut self, repairer: &P) {
        self.set_state(ChainState::Repairing);
        info!(pending = self.pending.len(), "repairing stalled chain");
        let pending: &[String] = self.pending.make_contiguous();
        if let Err(e) = repairer.repair(pending).await {
            warn!(error = %e, "repair failed");
        }
    }

    async fn pause(&self) -> Result<(), WalletError> {
        let interval = self.limits.poll_interval();
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(WalletError::Cancelled),
                _ = self.clock.sleep(interval) => Ok(()),
            },
            None => {
                self.clock.sleep(interval).await;
                Ok(())
            }
        }
    }

    // Assumes the chain confirms in the order it was sent.
    fn drop_confirmed(&mut self, confirmed: u64) {
        let n = (confirmed as usize).min(self.pending.len());
        self.pending.drain(..n);
    }

    /// Rebuild the pending chain from the node's mempool.
    ///
    /// Follows `depends` back from `tip_txid` until a transaction has no
    /// unconfirmed parent. Counters come from the tip's entry. A tip that is
    /// not in the mempool leaves an empty chain.
    pub async fn reconstruct<R: NodeRpc + Sync>(
        &mut self,
        rpc: &R,
        tip_txid: &str,
    ) -> Result<(), WalletError> {
        self.pending.clear();
        self.ancestor_count = 0;
        self.ancestor_size = 0;

        let Some(tip) = rpc.get_mempool_entry(tip_txid).await? else {
            debug!(tip = tip_txid, "tip not in mempool, chain is empty");
            return Ok(());
        };

        let mut chain = VecDeque::new();
        let mut txid = tip_txid.to_string();
        let mut parent = tip.depends.first().cloned();
        loop {
            chain.push_front(rpc.get_raw_transaction(&txid).await?);
            if chain.len() as u64 >= tip.ancestor_count {
                break;
            }
            let Some(next) = parent.take() else { break };
            match rpc.get_mempool_entry(&next).await? {
                Some(entry) => parent = entry.depends.first().cloned(),
                None => break,
            }
            txid = next;
        }

        self.ancestor_count = tip.ancestor_count;
        self.ancestor_size = tip.ancestor_size;
        self.pending = chain;
        info!(
            count = self.ancestor_count,
            size = self.ancestor_size,
            pending = self.pending.len(),
            "reconstructed mempool chain"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::TokioClock;
    use crate::tests::{FakeNode, FakeRepairer};

    fn limits(max_count: u64) -> ChainLimits {
        ChainLimits {
            max_ancestor_count: max_count,
            max_ancestor_size: 1_000_000,
            poll_interval_ms: 1000,
            repair_after_secs: 60,
        }
    }

    fn filled(max_count: u64, sends: usize) -> MempoolChainManager<TokioClock> {
        let mut chain = MempoolChainManager::new(limits(max_count), TokioClock);
        for i in 0..sends {
            chain.record_send(&format!("{:02x}{}", i, "00".repeat(99)));
        }
        chain
    }

    #[test]
    fn test_record_send() {
        let chain = filled(100, 3);
        assert_eq!(chain.ancestor_count(), 3);
        assert_eq!(chain.ancestor_size(), 300);
        assert_eq!(chain.pending_len(), 3);
        assert_eq!(chain.state(), ChainState::Idle);
        assert!(chain.pending().next().unwrap().starts_with("00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_below_limit_does_not_poll() {
        let node = FakeNode::default();
        let mut chain = filled(10, 3);
        chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await.unwrap();
        assert_eq!(chain.state(), ChainState::Sending);
        assert_eq!(node.mempool_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_limit_throttles() {
        let node = FakeNode::default();
        node.push_mempool("tip", Some((2, 150)));
        let mut chain = MempoolChainManager::new(
            ChainLimits { max_ancestor_size: 250, ..limits(100) },
            TokioClock,
        );
        chain.record_send(&"00".repeat(100));
        chain.record_send(&"00".repeat(150));
        chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await.unwrap();
        assert_eq!(chain.ancestor_size(), 150);
        assert_eq!(chain.ancestor_count(), 2);
        assert_eq!(chain.pending_len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmations_shrink_from_front() {
        let node = FakeNode::default();
        node.push_mempool("tip", Some((5, 500)));
        node.push_mempool("tip", Some((3, 300)));
        let mut chain = filled(5, 5);
        let second = chain.pending().nth(2).unwrap().to_string();

        let started = tokio::time::Instant::now();
        chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(chain.ancestor_count(), 3);
        assert_eq!(chain.ancestor_size(), 300);
        assert_eq!(chain.pending_len(), 3);
        assert_eq!(chain.pending().next().unwrap(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_tip_clears_chain() {
        let node = FakeNode::default();
        node.push_mempool("tip", None);
        node.set_confirmations("tip", 1);
        let mut chain = filled(4, 4);
        chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await.unwrap();
        assert_eq!(chain.ancestor_count(), 0);
        assert_eq!(chain.ancestor_size(), 0);
        assert_eq!(chain.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_tip_is_fatal() {
        let node = FakeNode::default();
        node.push_mempool("tip", None);
        node.set_confirmations("tip", 0);
        let mut chain = filled(4, 4);
        let err = chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await;
        assert!(matches!(err, Err(WalletError::ChainState(_))));
        assert_eq!(chain.state(), ChainState::Idle);
        assert_eq!(node.mempool_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_triggers_repair() {
        let node = FakeNode::default();
        for _ in 0..61 {
            node.push_mempool("tip", Some((20, 2000)));
        }
        node.push_mempool("tip", Some((19, 1900)));
        let repairer = FakeRepairer::default();
        let mut chain = filled(20, 20);

        let started = tokio::time::Instant::now();
        chain.ensure_capacity(&node, "tip", &repairer).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(61));

        // One repair for the stall, one more because only 1 of 20 confirmed
        // after a long stall.
        let calls = repairer.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), 20);
        assert_eq!(calls[1].len(), 19);
        assert_eq!(chain.pending_len(), 19);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repair_runs_in_repairing_state() {
        let node = FakeNode::default();
        for _ in 0..61 {
            node.push_mempool("tip", Some((20, 2000)));
        }
        node.push_mempool("tip", Some((19, 1900)));
        let repairer = FakeRepairer::default();
        let mut chain = filled(20, 20);
        repairer.watch(chain.subscribe());

        chain.ensure_capacity(&node, "tip", &repairer).await.unwrap();
        assert_eq!(repairer.states(), vec![ChainState::Repairing, ChainState::Repairing]);
        assert_eq!(chain.state(), ChainState::Sending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_until_room() {
        let node = FakeNode::default();
        node.push_mempool("tip", Some((3, 300)));
        node.push_mempool("tip", Some((3, 300)));
        node.push_mempool("tip", Some((2, 200)));
        let mut chain = filled(3, 3);
        let mut states = chain.subscribe();
        let repairer = FakeRepairer::default();

        let (done, seen) = tokio::join!(chain.ensure_capacity(&node, "tip", &repairer), async {
            states.wait_for(|s| *s == ChainState::Throttled).await.unwrap();
            node.mempool_calls()
        });
        done.unwrap();
        assert_eq!(seen, 1);
        assert_eq!(node.mempool_calls(), 3);
        assert!(repairer.calls().is_empty());
        assert_eq!(chain.state(), ChainState::Sending);
        assert_eq!(chain.pending_len(), 2);
        assert!(chain.pending().next().unwrap().starts_with("01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_throttled() {
        let node = FakeNode::default();
        for _ in 0..10 {
            node.push_mempool("tip", Some((4, 400)));
        }
        let token = CancellationToken::new();
        let mut chain = MempoolChainManager::new(limits(4), TokioClock).with_cancellation(token.clone());
        for _ in 0..4 {
            chain.record_send("00");
        }

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });
        let err = chain.ensure_capacity(&node, "tip", &FakeRepairer::default()).await;
        assert!(matches!(err, Err(WalletError::Cancelled)));
        assert_eq!(node.mempool_calls(), 3);
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_reconstruct_walks_depends() {
        let node = FakeNode::default();
        node.set_chain(&[("a", "aa00"), ("b", "bb00"), ("c", "cc00")]);
        let mut chain = MempoolChainManager::new(limits(100), TokioClock);
        chain.reconstruct(&node, "c").await.unwrap();

        assert_eq!(chain.pending().collect::<Vec<_>>(), vec!["aa00", "bb00", "cc00"]);
        assert_eq!(chain.ancestor_count(), 3);
        assert_eq!(chain.ancestor_size(), 6);
    }

    #[tokio::test]
    async fn test_reconstruct_confirmed_tip() {
        let node = FakeNode::default();
        let mut chain = filled(100, 2);
        chain.reconstruct(&node, "gone").await.unwrap();
        assert_eq!(chain.pending_len(), 0);
        assert_eq!(chain.ancestor_count(), 0);
    }
}
