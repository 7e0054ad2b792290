//! The lifecycle coordinator: create, reload, and decrypt-and-verify flows.
//!
//! The coordinator sequences the encryption gateway and the two ledger
//! views, keeps the loaded claim set, and reports every flow's progress on
//! a [`StatusBoard`]. Failures inside a flow are mapped to a status message
//! and returned; no flow leaves a guard or marker behind.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use fhe_refund_core::{
    validate_draft, Address, BusinessKey, Claim, ClaimDraft, ClaimPhase, ClaimView,
    DashboardStats, LocalDecryption, OperationId, RefundAnalysis, TransactionStatus, ValidDraft,
};
use fhe_refund_gateway::EncryptionGateway;
use fhe_refund_ledger::{
    ClaimReader, ClaimWriter, CreateClaimRequest, LedgerError, TxConfirmation,
};

use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::guard::DecryptionGuards;
use crate::status::{StatusBoard, StatusSnapshot};
use crate::store::ClaimStore;

/// Status messages shown to the user.
pub mod messages {
    pub const CREATING: &str = "Creating tax refund with Zama FHE...";
    pub const AWAITING_CONFIRMATION: &str = "Waiting for transaction confirmation...";
    pub const CREATED: &str = "Tax refund created successfully!";
    pub const CONNECT_WALLET: &str = "Please connect wallet first";
    pub const REJECTED: &str = "Transaction rejected by user";
    pub const SUBMISSION_FAILED: &str = "Submission failed: ";
    pub const ALREADY_VERIFIED: &str = "Data already verified on-chain";
    pub const ALREADY_VERIFIED_RACE: &str = "Data is already verified on-chain";
    pub const VERIFYING: &str = "Verifying decryption on-chain...";
    pub const VERIFIED: &str = "Data decrypted and verified successfully!";
    pub const DECRYPTION_FAILED: &str = "Decryption failed: ";
    pub const LOAD_FAILED: &str = "Failed to load data";
    pub const INIT_FAILED: &str =
        "FHEVM initialization failed. Please check your wallet connection.";
}

/// Terminal outcome of a successful verification attempt.
enum VerifyOutcome {
    /// The ledger already held a verified value; nothing was submitted.
    AlreadyVerified(u64),
    /// A verification transaction was confirmed.
    Verified(u64),
}

/// Orchestrates claim creation, reloads, and decrypt-and-verify.
///
/// `R` is the read-only ledger view, `W` the signer-bound view (bound by
/// [`connect`](Self::connect)), `G` the encryption gateway.
pub struct LifecycleCoordinator<R, W, G> {
    reader: R,
    gateway: G,
    signer: RwLock<Option<Arc<W>>>,
    config: CoordinatorConfig,
    store: ClaimStore,
    guards: DecryptionGuards,
    status: StatusBoard,
    /// Keys whose creation flow is running.
    creating: Mutex<HashSet<BusinessKey>>,
    /// Last millis used for a business key.
    last_key_millis: AtomicI64,
}

impl<R, W, G> LifecycleCoordinator<R, W, G>
where
    R: ClaimReader,
    W: ClaimWriter,
    G: EncryptionGateway,
{
    /// Create a coordinator with no signer bound.
    pub fn new(reader: R, gateway: G, config: CoordinatorConfig) -> Self {
        let status = StatusBoard::new(config.success_display, config.error_display);
        Self {
            reader,
            gateway,
            signer: RwLock::new(None),
            config,
            store: ClaimStore::new(),
            guards: DecryptionGuards::new(),
            status,
            creating: Mutex::new(HashSet::new()),
            last_key_millis: AtomicI64::new(0),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The claims contract address.
    pub fn contract_address(&self) -> Address {
        self.reader.contract_address()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────────────────────

    /// Bind a signer, initialise the gateway, and load claims.
    ///
    /// The signer stays bound even if initialisation fails; operations that
    /// need the gateway will then fail on their own.
    pub async fn connect(&self, writer: W) -> Result<()> {
        let address = writer.signer();
        *self.signer.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(writer));
        tracing::info!(signer = %address, "signer connected");

        if let Err(e) = self.gateway.initialize().await {
            let op = self.status.begin();
            tracing::error!(error = %e, "encryption gateway initialization failed");
            self.status
                .set(op, TransactionStatus::Error(messages::INIT_FAILED.to_string()));
            return Err(e.into());
        }

        self.reload().await.map(|_| ())
    }

    /// Unbind the signer.
    pub fn disconnect(&self) {
        if let Some(writer) = self
            .signer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            tracing::info!(signer = %writer.signer(), "signer disconnected");
        }
    }

    /// Whether a signer is bound.
    pub fn is_connected(&self) -> bool {
        self.writer().is_some()
    }

    /// Address of the bound signer.
    pub fn signer_address(&self) -> Option<Address> {
        self.writer().map(|w| w.signer())
    }

    fn writer(&self) -> Option<Arc<W>> {
        self.signer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_writer(&self, op: OperationId) -> Result<Arc<W>> {
        self.writer().ok_or_else(|| {
            self.status.set(
                op,
                TransactionStatus::Error(messages::CONNECT_WALLET.to_string()),
            );
            CoordinatorError::NotConnected
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt and submit a new claim, then reload.
    ///
    /// Returns the business key of the confirmed claim. The caller clears
    /// its creation form on `Ok`.
    pub async fn create_claim(&self, draft: &ClaimDraft) -> Result<BusinessKey> {
        self.create_claim_as(self.begin_operation(), draft).await
    }

    /// [`create_claim`](Self::create_claim), reporting under `op`.
    ///
    /// `op` comes from [`begin_operation`](Self::begin_operation), so the
    /// caller can follow this flow through [`status_of`](Self::status_of)
    /// while other flows overlap.
    pub async fn create_claim_as(
        &self,
        op: OperationId,
        draft: &ClaimDraft,
    ) -> Result<BusinessKey> {
        let _scope = self.status.scope(op);
        let writer = self.require_writer(op)?;

        let draft = match validate_draft(draft) {
            Ok(d) => d,
            Err(e) => {
                let err = CoordinatorError::from(e);
                self.report_create_failure(op, &err);
                return Err(err);
            }
        };

        let key = self.next_business_key();
        let mark = CreatingMark::new(&self.creating, key.clone());
        self.status.set(
            op,
            TransactionStatus::Pending(messages::CREATING.to_string()),
        );

        let result = self.submit_claim(op, writer.as_ref(), &key, draft).await;
        drop(mark);

        match result {
            Ok(confirmation) => {
                tracing::info!(
                    key = %key,
                    tx = %confirmation.tx_hash,
                    block = confirmation.block_number,
                    "claim created"
                );
                self.status
                    .set(op, TransactionStatus::Success(messages::CREATED.to_string()));
                if let Err(e) = self.reload().await {
                    tracing::warn!(error = %e, "reload after creation failed");
                }
                Ok(key)
            }
            Err(e) => {
                self.report_create_failure(op, &e);
                Err(e)
            }
        }
    }

    async fn submit_claim(
        &self,
        op: OperationId,
        writer: &W,
        key: &BusinessKey,
        draft: ValidDraft,
    ) -> Result<TxConfirmation> {
        let contract = self.reader.contract_address();
        let owner = writer.signer();

        let input = self.gateway.encrypt(&contract, &owner, draft.amount).await?;

        let pending = writer
            .create_claim(CreateClaimRequest {
                key: key.clone(),
                name: draft.name,
                handle: input.handle,
                input_proof: input.proof,
                tax_rate_percent: draft.tax_rate_percent,
                reserved_public_value: self.config.reserved_public_value,
                label: self.config.claim_label.clone(),
            })
            .await?;

        tracing::info!(key = %key, tx = %pending.tx_hash(), "claim submitted");
        self.status.set(
            op,
            TransactionStatus::Pending(messages::AWAITING_CONFIRMATION.to_string()),
        );

        Ok(pending.wait().await?)
    }

    fn report_create_failure(&self, op: OperationId, err: &CoordinatorError) {
        let message = if err.is_rejection() {
            messages::REJECTED.to_string()
        } else {
            format!("{}{}", messages::SUBMISSION_FAILED, err)
        };
        tracing::error!(error = %err, "claim creation failed");
        self.status.set(op, TransactionStatus::Error(message));
    }

    /// Derive a key from the current time, strictly increasing per coordinator.
    fn next_business_key(&self) -> BusinessKey {
        let now = now_millis();
        let mut last = self.last_key_millis.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_key_millis.compare_exchange(
                last,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return BusinessKey::from_millis(&self.config.key_prefix, next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Keys whose creation flow is running.
    pub fn creating_keys(&self) -> Vec<BusinessKey> {
        self.creating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decrypt and verify
    // ─────────────────────────────────────────────────────────────────────────

    /// Decrypt a claim's amount and record it on-chain with proof.
    ///
    /// Returns the verified cleartext. An already-verified claim returns its
    /// stored value without submitting anything. If a concurrent verifier
    /// wins the race, the claim set is reloaded and the stored value (if
    /// loaded) is returned.
    ///
    /// Fails with [`CoordinatorError::DecryptionInFlight`] while another
    /// call holds the guard for `key`.
    pub async fn decrypt_and_verify(&self, key: &BusinessKey) -> Result<Option<u64>> {
        self.decrypt_and_verify_as(self.begin_operation(), key).await
    }

    /// [`decrypt_and_verify`](Self::decrypt_and_verify), reporting under `op`.
    pub async fn decrypt_and_verify_as(
        &self,
        op: OperationId,
        key: &BusinessKey,
    ) -> Result<Option<u64>> {
        let _scope = self.status.scope(op);
        let writer = self.require_writer(op)?;

        let Some(_permit) = self.guards.try_acquire(key) else {
            tracing::warn!(key = %key, "decryption already in flight");
            return Err(CoordinatorError::DecryptionInFlight(key.clone()));
        };

        match self.verify(op, writer.as_ref(), key).await {
            Ok(VerifyOutcome::AlreadyVerified(value)) => {
                tracing::debug!(key = %key, "claim already verified, nothing submitted");
                self.status.set(
                    op,
                    TransactionStatus::Success(messages::ALREADY_VERIFIED.to_string()),
                );
                Ok(Some(value))
            }
            Ok(VerifyOutcome::Verified(value)) => {
                if let Err(e) = self.reload().await {
                    tracing::warn!(error = %e, "reload after verification failed");
                }
                self.status
                    .set(op, TransactionStatus::Success(messages::VERIFIED.to_string()));
                Ok(Some(value))
            }
            Err(CoordinatorError::Ledger(LedgerError::AlreadyVerified(reason))) => {
                tracing::info!(key = %key, %reason, "claim verified by a concurrent verifier");
                if let Err(e) = self.reload().await {
                    tracing::warn!(error = %e, "reload after verification race failed");
                }
                self.status.set(
                    op,
                    TransactionStatus::Success(messages::ALREADY_VERIFIED_RACE.to_string()),
                );
                Ok(self.store.get(key).and_then(|c| c.decrypted_value()))
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "decrypt and verify failed");
                self.status.set(
                    op,
                    TransactionStatus::Error(format!("{}{}", messages::DECRYPTION_FAILED, e)),
                );
                Err(e)
            }
        }
    }

    async fn verify(
        &self,
        op: OperationId,
        writer: &W,
        key: &BusinessKey,
    ) -> Result<VerifyOutcome> {
        let record = self.reader.get_claim(key).await?;
        let claim = Claim::from_record(key.clone(), record, &self.config.key_prefix, 0)
            .map_err(LedgerError::from)?;
        if let Some(value) = claim.decrypted_value() {
            return Ok(VerifyOutcome::AlreadyVerified(value));
        }

        let handle = self.reader.get_ciphertext_handle(key).await?;
        let contract = self.reader.contract_address();
        let proof = self
            .gateway
            .request_decryption_proof(&[handle], &contract, &writer.signer())
            .await?;
        let value = proof
            .clear_value(&handle)
            .ok_or(CoordinatorError::MissingClearValue(handle))?;

        self.status.set(
            op,
            TransactionStatus::Pending(messages::VERIFYING.to_string()),
        );
        let pending = writer
            .submit_verify_decryption(key, proof.abi_encoded_clear_values, proof.proof)
            .await?;
        let confirmation = pending.wait().await?;
        tracing::info!(
            key = %key,
            tx = %confirmation.tx_hash,
            block = confirmation.block_number,
            "decryption verified on-chain"
        );

        Ok(VerifyOutcome::Verified(value))
    }

    /// Decrypt a claim for its owner only, without touching the ledger.
    ///
    /// The result is unverified and only fit for optimistic display.
    pub async fn decrypt_locally(&self, key: &BusinessKey) -> Result<LocalDecryption> {
        let writer = self.writer().ok_or(CoordinatorError::NotConnected)?;
        let handle = self.reader.get_ciphertext_handle(key).await?;
        let value = self
            .gateway
            .user_decrypt(&handle, &self.reader.contract_address(), &writer.signer())
            .await?;
        Ok(LocalDecryption {
            business_key: key.clone(),
            value,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reload
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the claim set with a fresh read of the ledger.
    ///
    /// Records that fail to load are logged and left out. Only a failure to
    /// list keys fails the reload, in which case the store is untouched.
    /// Returns the number of claims loaded.
    pub async fn reload(&self) -> Result<usize> {
        let keys = match self.reader.list_claim_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                let op = self.status.begin();
                tracing::error!(error = %e, "failed to list claims");
                self.status
                    .set(op, TransactionStatus::Error(messages::LOAD_FAILED.to_string()));
                return Err(e.into());
            }
        };

        let fallback_base = now_millis();
        let mut claims = Vec::with_capacity(keys.len());
        for (i, key) in keys.into_iter().enumerate() {
            let record = match self.reader.get_claim(&key).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping claim that failed to load");
                    continue;
                }
            };
            match Claim::from_record(key, record, &self.config.key_prefix, fallback_base + i as i64)
            {
                Ok(claim) => claims.push(claim),
                Err(e) => tracing::warn!(error = %e, "skipping malformed claim"),
            }
        }

        let count = claims.len();
        self.store.replace(claims);
        tracing::debug!(count, "claims reloaded");
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// All loaded claims.
    pub fn claims(&self) -> Vec<Claim> {
        self.store.all()
    }

    /// One loaded claim.
    pub fn claim(&self, key: &BusinessKey) -> Option<Claim> {
        self.store.get(key)
    }

    /// The loaded claim store.
    pub fn store(&self) -> &ClaimStore {
        &self.store
    }

    /// A loaded claim with an optional local decryption attached.
    pub fn view(&self, key: &BusinessKey, local: Option<LocalDecryption>) -> Option<ClaimView> {
        self.store.get(key).map(|claim| ClaimView::new(claim, local))
    }

    /// Refund analysis for a loaded claim.
    pub fn analyze(
        &self,
        key: &BusinessKey,
        local: Option<LocalDecryption>,
    ) -> Result<RefundAnalysis> {
        self.view(key, local)
            .map(|v| v.analysis())
            .ok_or_else(|| CoordinatorError::ClaimNotFound(key.clone()))
    }

    /// Dashboard figures over the loaded set at `now_secs`.
    pub fn dashboard(&self, now_secs: u64) -> DashboardStats {
        DashboardStats::compute(&self.store.all(), now_secs)
    }

    /// Lifecycle phase of a claim as seen by this coordinator.
    pub fn phase_of(&self, key: &BusinessKey) -> ClaimPhase {
        let creating = self
            .creating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key);
        if creating {
            return ClaimPhase::PendingCreate;
        }
        if self.guards.is_held(key) {
            return ClaimPhase::PendingVerify;
        }
        self.store
            .get(key)
            .map(|c| c.phase())
            .unwrap_or(ClaimPhase::Unsubmitted)
    }

    /// Whether a decryption is running for `key`.
    pub fn is_decrypting(&self, key: &BusinessKey) -> bool {
        self.guards.is_held(key)
    }

    /// The per-claim decryption guards.
    pub fn guards(&self) -> &DecryptionGuards {
        &self.guards
    }

    /// Allocate an operation id for a flow started with one of the `_as`
    /// methods.
    pub fn begin_operation(&self) -> OperationId {
        self.status.begin()
    }

    /// The currently visible status.
    pub fn status(&self) -> StatusSnapshot {
        self.status.current()
    }

    /// Status of one operation.
    pub fn status_of(&self, operation: OperationId) -> TransactionStatus {
        self.status.status_of(operation)
    }
}

/// Marks a key as being created until dropped.
struct CreatingMark<'a> {
    marks: &'a Mutex<HashSet<BusinessKey>>,
    key: BusinessKey,
}

impl<'a> CreatingMark<'a> {
    fn new(marks: &'a Mutex<HashSet<BusinessKey>>, key: BusinessKey) -> Self {
        marks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        Self { marks, key }
    }
}

impl Drop for CreatingMark<'_> {
    fn drop(&mut self) {
        self.marks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
