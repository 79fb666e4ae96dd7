use crate::controller::Controller;
use crate::jsonrpc::RpcError;
use crate::rpc::api::TerminalApi;
use crate::rpc::method::RpcMethod;

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, PoisonError};

use log::{info, warn};
use serde_json::Value;

/// Counter value while a reset is swapping the binding.
const RESETTING: i64 = i64::MIN;

/// Decrements the pending counter when a call finishes, however it finishes.
struct PendingGuard<'a> {
    pending: &'a AtomicI64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct RpcAdapter {
    controller: Arc<Controller>,
    api: RwLock<Arc<TerminalApi>>,
    pending: AtomicI64,
    generation: AtomicU64,
}

impl RpcAdapter {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self {
            api: RwLock::new(Arc::new(TerminalApi::new(controller.clone(), 0))),
            controller,
            pending: AtomicI64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    /// Calls currently executing against the active binding.
    pub fn pending_requests(&self) -> u64 {
        self.pending.load(Ordering::SeqCst).max(0) as u64
    }

    /// Number of successful resets so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn current_api(&self) -> Arc<TerminalApi> {
        self.api
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a call. Waits out a reset that is mid-swap.
    async fn enter(&self) -> PendingGuard<'_> {
        loop {
            let current = self.pending.load(Ordering::SeqCst);
            if current >= 0 {
                if self
                    .pending
                    .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    return PendingGuard {
                        pending: &self.pending,
                    };
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Dispatches `method` (dispatch name, e.g. `EvalNew`) with `params`.
    ///
    /// Unknown methods are refused before the call is counted.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let method: RpcMethod = method
            .parse()
            .map_err(|name: String| RpcError::method_not_found(&name))?;

        let _pending = self.enter().await;
        let api = self.current_api();
        api.invoke(method, params).await
    }

    /// Clears every fault flag and swaps in a fresh binding.
    ///
    /// Returns false, changing nothing, while any call is in flight.
    pub fn reset(&self) -> bool {
        if let Err(pending) =
            self.pending
                .compare_exchange(0, RESETTING, Ordering::SeqCst, Ordering::SeqCst)
        {
            warn!("Reset refused: {} call(s) in flight", pending.max(0));
            return false;
        }

        self.controller.heal_api();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.api.write().unwrap_or_else(PoisonError::into_inner) =
            Arc::new(TerminalApi::new(self.controller.clone(), generation));

        self.pending.store(0, Ordering::SeqCst);
        info!("API reset, binding generation {generation}");
        true
    }
}
