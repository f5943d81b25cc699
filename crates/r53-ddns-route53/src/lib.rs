// # Route 53 DNS Provider
//
// This crate provides the AWS Route 53 implementation of `DnsProvider` for
// the Route 53 DDNS updater.
//
// ## Behavior
//
// - One API request per call. Retries and delays are owned by the
//   reconciler, not by this provider.
// - Credentials, profile and region go through the standard AWS SDK
//   credential chain (`AWS_PROFILE` / `AWS_REGION` only select within it).
// - Dry-run mode performs every read but only logs the change batch.
//
// ## API Reference
//
// - Read: `ListResourceRecordSets` starting at `(name, type)`, one item
// - Write: `ChangeResourceRecordSets` with a single `UPSERT` change

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::{ProvideCredentials, Region};
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use r53_ddns_core::config::AwsConfig;
use r53_ddns_core::records::RecordKind;
use r53_ddns_core::traits::{DnsProvider, RecordChange, RemoteRecord, names_match};
use r53_ddns_core::{Error, Result};

const PROVIDER: &str = "route53";

/// AWS Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all record reads
/// - Log the intended change batch
/// - **NOT** submit any change
#[derive(Debug, Clone)]
pub struct Route53Provider {
    client: Client,
    dry_run: bool,
}

impl Route53Provider {
    /// Wrap an existing SDK client
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Build a client from the SDK default chain, narrowed by the
    /// configured profile and region.
    ///
    /// Fails when the chain yields no usable credentials, so a broken AWS
    /// setup aborts the run instead of failing every record.
    pub async fn from_config(aws: &AwsConfig, dry_run: bool) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;
        check_credentials(&sdk_config).await?;
        tracing::debug!(
            "Route 53 client ready (profile: {}, region: {})",
            aws.profile.as_deref().unwrap_or("default chain"),
            sdk_config
                .region()
                .map(|r| r.as_ref())
                .unwrap_or("default chain")
        );

        Ok(Self::new(Client::new(&sdk_config), dry_run))
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Resolve credentials once up front
async fn check_credentials(sdk_config: &SdkConfig) -> Result<()> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| Error::provider(PROVIDER, "No AWS credentials provider configured"))?;

    provider.provide_credentials().await.map_err(|e| {
        Error::provider(
            PROVIDER,
            format!("Failed to load AWS credentials: {}", DisplayErrorContext(&e)),
        )
    })?;
    Ok(())
}

fn rr_type(kind: &RecordKind) -> RrType {
    RrType::from(kind.as_str())
}

/// Pick the record set for `(name, kind)` out of a listing page.
///
/// A listing starts at the requested name but returns the next set in
/// order when the requested one does not exist, so both fields must be
/// checked.
fn matching_record(sets: &[ResourceRecordSet], name: &str, kind: &RecordKind) -> Option<RemoteRecord> {
    let wanted = rr_type(kind);
    let set = sets
        .iter()
        .find(|set| set.r#type() == &wanted && names_match(set.name(), name))?;

    let value = set.resource_records().first()?.value().to_string();
    Some(RemoteRecord {
        value,
        ttl: set.ttl().and_then(|ttl| u32::try_from(ttl).ok()),
    })
}

/// Build the single-change UPSERT batch for `change`
fn change_batch(change: &RecordChange<'_>) -> Result<ChangeBatch> {
    let build_error = |e: aws_sdk_route53::error::BuildError| {
        Error::provider(PROVIDER, format!("Invalid change for {}: {}", change.name, e))
    };

    let record_set = ResourceRecordSet::builder()
        .name(change.name)
        .r#type(rr_type(change.kind))
        .ttl(i64::from(change.ttl))
        .resource_records(
            ResourceRecord::builder()
                .value(change.value)
                .build()
                .map_err(build_error)?,
        )
        .build()
        .map_err(build_error)?;

    ChangeBatch::builder()
        .comment(change.comment)
        .changes(
            Change::builder()
                .action(ChangeAction::Upsert)
                .resource_record_set(record_set)
                .build()
                .map_err(build_error)?,
        )
        .build()
        .map_err(build_error)
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        kind: &RecordKind,
    ) -> Result<Option<RemoteRecord>> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(name)
            .start_record_type(rr_type(kind))
            .max_items(1)
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER,
                    format!("Failed to read {} {} in zone {}: {}", kind, name, zone_id, DisplayErrorContext(&e)),
                )
            })?;

        let record = matching_record(output.resource_record_sets(), name, kind);
        tracing::debug!(
            "{} {} in zone {}: {}",
            kind,
            name,
            zone_id,
            record.as_ref().map(|r| r.value.as_str()).unwrap_or("(absent)")
        );
        Ok(record)
    }

    async fn upsert_record(&self, change: &RecordChange<'_>) -> Result<()> {
        let batch = change_batch(change)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would UPSERT {} {} -> {} (ttl {}) in zone {}",
                change.kind,
                change.name,
                change.value,
                change.ttl,
                change.zone_id
            );
            return Ok(());
        }

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(change.zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER,
                    format!("Failed to update {} {}: {}", change.kind, change.name, DisplayErrorContext(&e)),
                )
            })?;

        tracing::debug!("UPSERT {} {} -> {} submitted", change.kind, change.name, change.value);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
