//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a loopback gateway, an
//! in-memory contract that checks proofs against it, and a signer.

use std::sync::Arc;

use fhe_refund::{CoordinatorConfig, LifecycleCoordinator};
use fhe_refund_core::Address;
use fhe_refund_gateway::{LoopbackGateway, LoopbackKeys};
use fhe_refund_ledger::{ClaimReader, MemoryLedger, MemorySigner};

/// Contract address used by fixtures.
pub const CONTRACT: Address = Address([0xC0; 20]);

/// Coordinator over the in-memory contract.
pub type MemoryCoordinator<R = MemoryLedger> =
    LifecycleCoordinator<R, MemorySigner, Arc<LoopbackGateway>>;

/// A gateway, contract, and signer wired together.
pub struct TestFixture {
    pub gateway: Arc<LoopbackGateway>,
    pub ledger: MemoryLedger,
    pub owner: Address,
    pub signer: MemorySigner,
}

impl TestFixture {
    /// Create a new fixture with random gateway keys.
    pub fn new() -> Self {
        Self::from_gateway(LoopbackGateway::new(), Address::from_bytes([0xAA; 20]))
    }

    /// Create with deterministic gateway keys and owner derived from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let mut owner = [0u8; 20];
        owner.copy_from_slice(&seed[..20]);
        Self::from_gateway(
            LoopbackGateway::with_keys(LoopbackKeys::from_seed(&seed)),
            Address::from_bytes(owner),
        )
    }

    fn from_gateway(gateway: LoopbackGateway, owner: Address) -> Self {
        let gateway = Arc::new(gateway);
        let ledger = MemoryLedger::new(CONTRACT, gateway.clone());
        let signer = ledger.signer(owner);
        Self {
            gateway,
            ledger,
            owner,
            signer,
        }
    }

    /// Configuration used by fixture coordinators.
    pub fn config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default()
    }

    /// A coordinator reading the contract directly. Not connected.
    pub fn coordinator(&self) -> MemoryCoordinator {
        self.coordinator_with(self.ledger.clone())
    }

    /// A coordinator reading through `reader`. Not connected.
    pub fn coordinator_with<R: ClaimReader>(&self, reader: R) -> MemoryCoordinator<R> {
        LifecycleCoordinator::new(reader, self.gateway.clone(), self.config())
    }

    /// A coordinator connected with this fixture's signer.
    pub async fn connected(&self) -> MemoryCoordinator {
        let coordinator = self.coordinator();
        // Fixture wiring cannot fail unless the gateway was made unavailable.
        let _ = coordinator.connect(self.signer.clone()).await;
        coordinator
    }

    /// Another signer on the same contract.
    pub fn other_signer(&self, byte: u8) -> MemorySigner {
        self.ledger.signer(Address::from_bytes([byte; 20]))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-writer tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhe_refund_core::ClaimDraft;

    #[tokio::test]
    async fn test_fixture_connects() {
        let fixture = TestFixture::new();
        let coordinator = fixture.connected().await;
        assert!(coordinator.is_connected());
        assert_eq!(coordinator.signer_address(), Some(fixture.owner));
        assert_eq!(coordinator.contract_address(), CONTRACT);
    }

    #[tokio::test]
    async fn test_seeded_fixtures_differ() {
        let a = TestFixture::with_seed([1u8; 32]);
        let b = TestFixture::with_seed([2u8; 32]);
        assert_ne!(a.owner, b.owner);
    }

    #[tokio::test]
    async fn test_fixture_creates_claim() {
        let fixture = TestFixture::with_seed([3u8; 32]);
        let coordinator = fixture.connected().await;
        coordinator
            .create_claim(&ClaimDraft::new("fixture", "10", "10"))
            .await
            .unwrap();
        assert_eq!(fixture.ledger.claim_count(), 1);
        assert_eq!(fixture.gateway.ciphertext_count(), 1);
    }
}
