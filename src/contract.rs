//! The dataset management contract.
//!
//! [`DatasetContract`] is the transaction surface hosts invoke. Every call
//! receives a [`TransactionContext`] holding the world-state view and the
//! verified caller; the contract keeps no state of its own beyond its
//! configuration.
//!
//! Write paths check every precondition before the single `put_state`, so a
//! rejected call never changes world state.

use tracing::{debug, error, info, warn};

use crate::config::{ContractConfig, ScanPolicy};
use crate::dataset::Dataset;
use crate::document::DidDocument;
use crate::error::{ContractError, ContractResult};
use crate::identity::{resolve_owner, ClientIdentity};
use crate::storage::StateStore;

/// Name under which hosts register the contract.
pub const CONTRACT_NAME: &str = "did4dcat";

/// Contract version reported to hosts.
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything one invocation may touch.
#[derive(Clone, Copy)]
pub struct TransactionContext<'a> {
    stub: &'a dyn StateStore,
    identity: &'a dyn ClientIdentity,
}

impl<'a> TransactionContext<'a> {
    /// Bundle a world-state view with the caller that invoked the transaction.
    #[must_use]
    pub fn new(stub: &'a dyn StateStore, identity: &'a dyn ClientIdentity) -> Self {
        Self { stub, identity }
    }

    /// World state for this invocation.
    #[must_use]
    pub fn stub(&self) -> &'a dyn StateStore {
        self.stub
    }

    /// The verified caller.
    #[must_use]
    pub fn client_identity(&self) -> &'a dyn ClientIdentity {
        self.identity
    }
}

/// Create/update/read/list operations over DID documents.
#[derive(Debug, Clone, Default)]
pub struct DatasetContract {
    config: ContractConfig,
}

impl DatasetContract {
    /// Contract with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contract with a validated custom configuration.
    ///
    /// # Errors
    /// `Config` if [`ContractConfig::validate`] rejects `config`.
    pub fn with_config(config: ContractConfig) -> ContractResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Instantiation hook. Seeds nothing.
    ///
    /// # Errors
    /// Never fails; the signature matches the other transactions.
    pub fn init_ledger(&self, _ctx: &TransactionContext<'_>) -> ContractResult<()> {
        info!(contract = CONTRACT_NAME, version = CONTRACT_VERSION, "ledger initialized");
        Ok(())
    }

    /// Register a new DID document. The caller becomes its owner.
    ///
    /// # Errors
    /// - `MalformedDocument` if the payload is not a JSON object with a string `id`
    /// - `AlreadyExists` if a dataset is stored under that `id`
    /// - `Identity` if the caller has no usable owner tuple
    pub fn create_dataset(
        &self,
        ctx: &TransactionContext<'_>,
        did_document: &str,
    ) -> ContractResult<Dataset> {
        let document = self.parse_document(did_document)?;
        let did = document.id()?;

        let stub = ctx.stub();
        if read_state(stub, did)?.is_some() {
            warn!(did, "create rejected: dataset already exists");
            return Err(ContractError::AlreadyExists {
                did: did.to_string(),
            });
        }

        let owner = resolve_owner(ctx.client_identity())?;
        let dataset = Dataset::new(did, did_document, owner);

        stub.put_state(&dataset.did, dataset.to_canonical_json()?)?;
        info!(did = %dataset.did, msp_id = %dataset.owner.msp_id, "dataset created");
        Ok(dataset)
    }

    /// Replace the document of an existing dataset.
    ///
    /// Only the creator may update. The stored `issued` value always
    /// survives; whatever the caller sent for it is discarded.
    ///
    /// # Errors
    /// - `MalformedDocument` for a bad payload, or if the stored document has no `issued`
    /// - `NotFound` if nothing is stored under the document's `id`
    /// - `Unauthorized` if the caller is not the owner
    /// - `CorruptRecord` if the stored value does not decode
    pub fn update_dataset(
        &self,
        ctx: &TransactionContext<'_>,
        did_document: &str,
    ) -> ContractResult<Dataset> {
        let document = self.parse_document(did_document)?;
        let did = document.id()?.to_string();

        let stub = ctx.stub();
        let Some(stored) = read_state(stub, &did)? else {
            warn!(did = %did, "update rejected: dataset does not exist");
            return Err(ContractError::NotFound { did });
        };
        let existing = decode_record(&did, &stored)?;

        let caller = resolve_owner(ctx.client_identity())?;
        if !existing.is_owned_by(&caller) {
            warn!(did = %did, "update rejected: caller is not the owner");
            return Err(ContractError::Unauthorized);
        }

        let issued = DidDocument::parse(&existing.did_document)
            .map_err(|e| {
                ContractError::malformed(format!("stored document for {did} does not parse: {e}"))
            })?
            .issued()
            .cloned()
            .ok_or_else(|| {
                ContractError::malformed(format!("stored document for {did} has no 'issued' field"))
            })?;
        let merged = document.with_issued(issued).to_json_string()?;

        let dataset = Dataset::new(did, merged, existing.owner);
        stub.put_state(&dataset.did, dataset.to_canonical_json()?)?;
        info!(did = %dataset.did, msp_id = %dataset.owner.msp_id, "dataset updated");
        Ok(dataset)
    }

    /// Fetch one dataset by key. Any caller may read any dataset.
    ///
    /// # Errors
    /// - `NotFound` if nothing is stored under `did`
    /// - `CorruptRecord` if the stored value does not decode
    pub fn read_dataset(&self, ctx: &TransactionContext<'_>, did: &str) -> ContractResult<Dataset> {
        match read_state(ctx.stub(), did)? {
            Some(stored) => decode_record(did, &stored),
            None => {
                warn!(did, "read rejected: dataset does not exist");
                Err(ContractError::NotFound {
                    did: did.to_string(),
                })
            }
        }
    }

    /// Every dataset created by the caller, in key order.
    ///
    /// # Errors
    /// - `Identity` if the caller has no usable owner tuple
    /// - `CorruptRecord` for an undecodable value under [`ScanPolicy::Abort`]
    pub fn get_my_datasets(&self, ctx: &TransactionContext<'_>) -> ContractResult<Vec<Dataset>> {
        let owner = resolve_owner(ctx.client_identity())?;
        let mine: Vec<Dataset> = self
            .scan_all(ctx.stub())?
            .into_iter()
            .filter(|d| d.is_owned_by(&owner))
            .collect();
        debug!(owner = %owner, count = mine.len(), "listed caller datasets");
        Ok(mine)
    }

    /// Every dataset on the ledger, in key order.
    ///
    /// # Errors
    /// `CorruptRecord` for an undecodable value under [`ScanPolicy::Abort`].
    pub fn get_all_datasets(&self, ctx: &TransactionContext<'_>) -> ContractResult<Vec<Dataset>> {
        let all = self.scan_all(ctx.stub())?;
        debug!(count = all.len(), "listed all datasets");
        Ok(all)
    }

    fn parse_document(&self, raw: &str) -> ContractResult<DidDocument> {
        if raw.len() > self.config.max_document_bytes {
            return Err(ContractError::malformed(format!(
                "document is {} bytes, limit is {}",
                raw.len(),
                self.config.max_document_bytes
            )));
        }
        DidDocument::parse(raw)
    }

    fn scan_all(&self, stub: &dyn StateStore) -> ContractResult<Vec<Dataset>> {
        let entries = stub.get_state_by_range("", "")?;
        let mut out = Vec::with_capacity(entries.len());
        for kv in entries {
            match decode_record(&kv.key, &kv.value) {
                Ok(dataset) => out.push(dataset),
                Err(e) => match self.config.scan_policy {
                    ScanPolicy::Abort => {
                        error!(key = %kv.key, error = %e, "scan aborted on undecodable record");
                        return Err(e);
                    }
                    ScanPolicy::Skip => {
                        warn!(key = %kv.key, error = %e, "scan skipped undecodable record");
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Value at `key`, treating an empty string the same as absence.
fn read_state(stub: &dyn StateStore, key: &str) -> ContractResult<Option<String>> {
    Ok(stub.get_state(key)?.filter(|v| !v.is_empty()))
}

/// Decode the record at `key`. Records are returned as written; a `did` that
/// disagrees with its key is logged, not rejected.
fn decode_record(key: &str, value: &str) -> ContractResult<Dataset> {
    let dataset = Dataset::from_state(key, value)?;
    if dataset.did != key {
        warn!(key, did = %dataset.did, "stored record names a different DID than its key");
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Value};

    use crate::identity::StaticIdentity;
    use crate::owner::DatasetOwner;
    use crate::storage::InMemoryStateStore;

    const DID: &str = "did:dcat:dataset:123456";
    const ISSUED: &str = "2022-09-19T18:05:20.997";

    fn did_document() -> Value {
        json!({
            "@context": ["https://www.w3.org/ns/did/v1", "https://did4dcat.org/context/v1"],
            "id": DID,
            "controller": "did:dcat:provider:example-provider",
            "@url": {"@id": "http://data.europa.eu/88u/dataset/europeana-aggregated-dataset.rdf"},
            "issued": ISSUED,
            "modified": "2022-09-20T20:05:20.997",
            "hash": {"value": "f4389t356t7zw457zn547zw4", "alg": "URDNA2015"}
        })
    }

    fn user() -> StaticIdentity {
        StaticIdentity::new("user", "Glass01MSP")
    }

    fn created(store: &InMemoryStateStore) -> Dataset {
        let id = user();
        let ctx = TransactionContext::new(store, &id);
        DatasetContract::new()
            .create_dataset(&ctx, &did_document().to_string())
            .unwrap()
    }

    #[test]
    fn create_stores_document_verbatim_with_caller_as_owner() {
        let store = InMemoryStateStore::new();
        let dataset = created(&store);

        assert_eq!(dataset.did, DID);
        assert_eq!(dataset.did_document, did_document().to_string());
        assert_eq!(dataset.owner, DatasetOwner::new("user", "Glass01MSP"));

        let stored = store.get_state(DID).unwrap().unwrap();
        assert_eq!(stored, dataset.to_canonical_json().unwrap());
    }

    #[test]
    fn create_twice_is_rejected_and_leaves_state_untouched() {
        let store = InMemoryStateStore::new();
        created(&store);
        let before = store.state_digest().unwrap();

        let other = StaticIdentity::new("admin", "Glass01MSP");
        let ctx = TransactionContext::new(&store, &other);
        let err = DatasetContract::new()
            .create_dataset(&ctx, &did_document().to_string())
            .unwrap_err();

        assert_eq!(err.to_string(), format!("Dataset {DID} already exist"));
        assert_eq!(err.code(), "DATASET_ALREADY_EXISTS");
        assert_eq!(store.state_digest().unwrap(), before);
    }

    #[test]
    fn empty_stored_value_counts_as_absent() {
        let store = InMemoryStateStore::new();
        store.put_state(DID, String::new()).unwrap();
        let dataset = created(&store);
        assert_eq!(dataset.did, DID);
    }

    #[test]
    fn create_without_identity_writes_nothing() {
        let store = InMemoryStateStore::new();
        let id = StaticIdentity::without_common_name("Glass01MSP");
        let ctx = TransactionContext::new(&store, &id);
        let err = DatasetContract::new()
            .create_dataset(&ctx, &did_document().to_string())
            .unwrap_err();
        assert_eq!(err.code(), "IDENTITY_ERROR");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn create_rejects_missing_id() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let err = DatasetContract::new()
            .create_dataset(&ctx, r#"{"issued":"2022-09-19T18:05:20.997"}"#)
            .unwrap_err();
        assert!(matches!(err, ContractError::MalformedDocument { .. }));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn oversized_document_is_rejected_before_store_access() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let contract =
            DatasetContract::with_config(ContractConfig::default().with_max_document_bytes(16))
                .unwrap();
        let err = contract
            .create_dataset(&ctx, &did_document().to_string())
            .unwrap_err();
        assert_eq!(err.code(), "MALFORMED_DOCUMENT");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn update_by_owner_keeps_original_issued() {
        let store = InMemoryStateStore::new();
        created(&store);

        let mut incoming = did_document();
        incoming["issued"] = json!("2022-09-22T18:05:20.997");
        incoming["modified"] = json!("2022-10-01T00:00:00.000");

        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let updated = DatasetContract::new()
            .update_dataset(&ctx, &incoming.to_string())
            .unwrap();

        let doc: Value = serde_json::from_str(&updated.did_document).unwrap();
        assert_eq!(doc["issued"], json!(ISSUED));
        assert_eq!(doc["modified"], json!("2022-10-01T00:00:00.000"));
        assert_eq!(updated.owner, DatasetOwner::new("user", "Glass01MSP"));

        let read = DatasetContract::new().read_dataset(&ctx, DID).unwrap();
        assert_eq!(read, updated);
    }

    #[test]
    fn update_supplies_issued_when_caller_omits_it() {
        let store = InMemoryStateStore::new();
        created(&store);

        let mut incoming = did_document();
        incoming.as_object_mut().unwrap().remove("issued");

        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let updated = DatasetContract::new()
            .update_dataset(&ctx, &incoming.to_string())
            .unwrap();
        let doc: Value = serde_json::from_str(&updated.did_document).unwrap();
        assert_eq!(doc["issued"], json!(ISSUED));
    }

    #[test]
    fn update_by_other_user_or_org_is_unauthorized() {
        let store = InMemoryStateStore::new();
        created(&store);
        let before = store.state_digest().unwrap();

        for intruder in [
            StaticIdentity::new("admin", "Glass01MSP"),
            StaticIdentity::new("user", "Glass02MSP"),
        ] {
            let ctx = TransactionContext::new(&store, &intruder);
            let err = DatasetContract::new()
                .update_dataset(&ctx, &did_document().to_string())
                .unwrap_err();
            assert_eq!(err.to_string(), "User is not authorized");
            assert_eq!(err.code(), "USER_NOT_AUTHORIZED");
            assert_eq!(store.state_digest().unwrap(), before);
        }
    }

    #[test]
    fn update_of_missing_dataset_is_not_found() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let err = DatasetContract::new()
            .update_dataset(&ctx, &did_document().to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Dataset {DID} does not exist"));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn update_fails_when_stored_document_lost_issued() {
        let store = InMemoryStateStore::new();
        let stale = Dataset::new(
            DID,
            json!({"id": DID}).to_string(),
            DatasetOwner::new("user", "Glass01MSP"),
        );
        store.put_state(DID, stale.to_canonical_json().unwrap()).unwrap();
        let before = store.state_digest().unwrap();

        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let err = DatasetContract::new()
            .update_dataset(&ctx, &did_document().to_string())
            .unwrap_err();
        assert!(matches!(err, ContractError::MalformedDocument { .. }));
        assert_eq!(store.state_digest().unwrap(), before);
    }

    #[test]
    fn read_needs_no_ownership() {
        let store = InMemoryStateStore::new();
        let original = created(&store);

        let stranger = StaticIdentity::new("admin", "Other01MSP");
        let ctx = TransactionContext::new(&store, &stranger);
        assert_eq!(DatasetContract::new().read_dataset(&ctx, DID).unwrap(), original);

        let err = DatasetContract::new().read_dataset(&ctx, "did:dcat:1111").unwrap_err();
        assert_eq!(err.to_string(), "Dataset did:dcat:1111 does not exist");
        assert_eq!(err.code(), "DATASET_NOT_FOUND");
    }

    #[test]
    fn scan_policy_decides_fate_of_corrupt_entries() {
        let store = InMemoryStateStore::new();
        created(&store);
        store.put_state("did:dcat:broken", "{oops".to_string()).unwrap();

        let id = user();
        let ctx = TransactionContext::new(&store, &id);

        let err = DatasetContract::new().get_all_datasets(&ctx).unwrap_err();
        match err {
            ContractError::CorruptRecord { key, .. } => assert_eq!(key, "did:dcat:broken"),
            other => panic!("expected corrupt record, got {other:?}"),
        }

        let lenient =
            DatasetContract::with_config(ContractConfig::default().with_scan_policy(ScanPolicy::Skip))
                .unwrap();
        let all = lenient.get_all_datasets(&ctx).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(lenient.get_my_datasets(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn update_keeps_number_text_of_untouched_fields() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let contract = DatasetContract::new();
        contract
            .create_dataset(&ctx, r#"{"id":"did:dcat:big","issued":"t0","size":1}"#)
            .unwrap();

        let updated = contract
            .update_dataset(
                &ctx,
                r#"{"id":"did:dcat:big","issued":"t9","size":123456789012345678901234567890,"ratio":1.10}"#,
            )
            .unwrap();
        assert_eq!(
            updated.did_document,
            r#"{"id":"did:dcat:big","issued":"t0","ratio":1.10,"size":123456789012345678901234567890}"#
        );
        assert_eq!(contract.read_dataset(&ctx, "did:dcat:big").unwrap(), updated);
    }

    #[test]
    fn create_accepts_numbers_beyond_float_range() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let contract = DatasetContract::new();
        let raw = r#"{"id":"did:dcat:huge","issued":"t0","v":1e400}"#;

        let dataset = contract.create_dataset(&ctx, raw).unwrap();
        assert_eq!(dataset.did_document, raw);
        assert_eq!(
            contract.read_dataset(&ctx, "did:dcat:huge").unwrap().did_document,
            raw
        );
    }

    #[test]
    fn read_returns_record_as_written_even_under_another_key() {
        let store = InMemoryStateStore::new();
        let misplaced = Dataset::new(
            "did:dcat:elsewhere",
            json!({"id": "did:dcat:elsewhere", "issued": ISSUED}).to_string(),
            DatasetOwner::new("user", "Glass01MSP"),
        );
        store
            .put_state(DID, misplaced.to_canonical_json().unwrap())
            .unwrap();

        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        let read = DatasetContract::new().read_dataset(&ctx, DID).unwrap();
        assert_eq!(read, misplaced);
        assert!(!read.same_identity(&Dataset::new(DID, "{}", read.owner.clone())));
    }

    #[test]
    fn init_ledger_seeds_nothing() {
        let store = InMemoryStateStore::new();
        let id = user();
        let ctx = TransactionContext::new(&store, &id);
        DatasetContract::new().init_ledger(&ctx).unwrap();
        assert!(store.is_empty().unwrap());
    }
}
