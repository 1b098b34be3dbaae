//! Opportunity service: CRUD, search, lifecycle and associations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use shared::dates::{end_of_day, start_of_day};
use shared::pagination::{page_from_parts, Page};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{DomainError, DomainResult};
use crate::lifecycle::{
    check_participant_increment, ensure_updatable, plan_expiration, plan_status_change,
    Transition,
};
use crate::models::opportunity::{join_keywords, split_keywords};
use crate::models::{
    LinkKind, LookupItem, LookupKind, Opportunity, OpportunityInfo, OpportunityRequest,
    OpportunitySearchFilter, OpportunitySearchFilterInfo, OpportunitySearchResults,
    OpportunitySearchResultsInfo, OpportunityStatus, Principal,
};
use crate::predicate::{build_search_predicate, distinct, search_text, TextMatches};
use crate::services::lookup::LookupService;
use crate::services::notification::{ExpirationNotifier, ExpiringOpportunity, NotificationResult};
use crate::store::{OpportunityStore, OrganizationStore, SearchQuery};

pub struct OpportunityService {
    store: Arc<dyn OpportunityStore>,
    organizations: Arc<dyn OrganizationStore>,
    lookups: Arc<LookupService>,
}

/// Checks the caller may manage opportunities and returns the trimmed username.
fn authorize(principal: &Principal) -> DomainResult<String> {
    let username = principal.username.trim();
    if username.is_empty() {
        return Err(DomainError::ArgumentNull("username"));
    }
    if !principal.is_administrator() {
        return Err(DomainError::Unauthorized(format!(
            "'{username}' is not allowed to manage opportunities"
        )));
    }
    Ok(username.to_string())
}

fn ids_argument(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Category => "categoryIds",
        LinkKind::Country => "countryIds",
        LinkKind::Language => "languageIds",
        LinkKind::Skill => "skillIds",
    }
}

impl OpportunityService {
    pub fn new(
        store: Arc<dyn OpportunityStore>,
        organizations: Arc<dyn OrganizationStore>,
        lookups: Arc<LookupService>,
    ) -> Self {
        Self {
            store,
            organizations,
            lookups,
        }
    }

    pub async fn get_by_id(&self, id: Uuid, include_children: bool) -> DomainResult<Opportunity> {
        if id.is_nil() {
            return Err(DomainError::ArgumentNull("id"));
        }
        self.store
            .find_by_id(id, include_children)
            .await?
            .ok_or_else(|| DomainError::not_found("Opportunity", id))
    }

    pub async fn get_info_by_id(&self, id: Uuid) -> DomainResult<OpportunityInfo> {
        Ok(self.get_by_id(id, true).await?.into())
    }

    pub async fn get_by_title_or_none(&self, title: &str) -> DomainResult<Option<Opportunity>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::ArgumentNull("title"));
        }
        self.store.find_by_title(title).await
    }

    pub async fn get_info_by_title_or_none(
        &self,
        title: &str,
    ) -> DomainResult<Option<OpportunityInfo>> {
        let found = self.get_by_title_or_none(title).await?;
        match found {
            Some(o) => Ok(self
                .store
                .find_by_id(o.id, true)
                .await?
                .map(OpportunityInfo::from)),
            None => Ok(None),
        }
    }

    async fn text_matches(&self, text: &str) -> DomainResult<TextMatches> {
        let organization_ids = self
            .organizations
            .find_name_contains(text)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        let ids = |items: Vec<LookupItem>| -> Vec<Uuid> { items.into_iter().map(|i| i.id).collect() };

        Ok(TextMatches {
            organization_ids,
            type_ids: ids(self.lookups.contains(LookupKind::Type, text).await?),
            category_ids: ids(self.lookups.contains(LookupKind::Category, text).await?),
            skill_ids: ids(self.lookups.contains(LookupKind::Skill, text).await?),
        })
    }

    /// Filtered search ordered by creation date, newest first.
    pub async fn search(
        &self,
        filter: &OpportunitySearchFilter,
    ) -> DomainResult<OpportunitySearchResults> {
        let page = page_from_parts(filter.page_number, filter.page_size)?;

        let matches = match search_text(filter) {
            Some(text) => Some(self.text_matches(text).await?),
            None => None,
        };
        let predicate = build_search_predicate(filter, matches.as_ref());
        let result = self.store.search(&SearchQuery { predicate, page }).await?;

        Ok(OpportunitySearchResults {
            total_count: page.map(|_| result.total_count),
            items: result.items,
        })
    }

    /// Public search over Active opportunities only.
    pub async fn search_info(
        &self,
        filter: OpportunitySearchFilterInfo,
    ) -> DomainResult<OpportunitySearchResultsInfo> {
        let filter = OpportunitySearchFilter::from(filter);
        Ok(self.search(&filter).await?.into())
    }

    /// Creates an opportunity when `request.id` is absent, otherwise updates it.
    pub async fn upsert(
        &self,
        request: OpportunityRequest,
        principal: &Principal,
    ) -> DomainResult<Opportunity> {
        let username = authorize(principal)?;
        request.validate()?;

        let existing = match request.id {
            Some(id) => {
                let current = self.get_by_id(id, true).await?;
                ensure_updatable(current.status)?;
                Some(current)
            }
            None => None,
        };

        let title = request.title.trim().to_string();
        if let Some(other) = self.store.find_by_title(&title).await? {
            if existing.as_ref().map(|e| e.id) != Some(other.id) {
                return Err(DomainError::Validation(format!(
                    "Opportunity with the specified name '{title}' already exists"
                )));
            }
        }

        let opportunity_type = self.lookups.get_by_id(LookupKind::Type, request.type_id).await?;
        let difficulty = self
            .lookups
            .get_by_id(LookupKind::Difficulty, request.difficulty_id)
            .await?;
        let interval = self
            .lookups
            .get_by_id(LookupKind::TimeInterval, request.commitment_interval_id)
            .await?;
        if request.organization_id.is_nil() {
            return Err(DomainError::ArgumentNull("organizationId"));
        }
        let organization = self
            .organizations
            .find_by_id(request.organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Organization", request.organization_id))?;

        let now = Utc::now();
        let keywords = request
            .keywords
            .as_deref()
            .and_then(join_keywords)
            .map(|k| split_keywords(&k));

        let mut opportunity = match existing {
            Some(current) => current,
            None => Opportunity {
                id: Uuid::new_v4(),
                title: String::new(),
                description: String::new(),
                type_id: Uuid::nil(),
                type_name: String::new(),
                organization_id: Uuid::nil(),
                organization_name: String::new(),
                instructions: None,
                url: None,
                zlto_reward: None,
                yoma_reward: None,
                zlto_reward_pool: None,
                yoma_reward_pool: None,
                verification_supported: false,
                difficulty_id: Uuid::nil(),
                difficulty_name: String::new(),
                commitment_interval_id: Uuid::nil(),
                commitment_interval_name: String::new(),
                commitment_interval_count: 1,
                participant_limit: None,
                participant_count: None,
                keywords: None,
                date_start: now,
                date_end: None,
                status: if request.post_as_active {
                    OpportunityStatus::Active
                } else {
                    OpportunityStatus::Inactive
                },
                created_by: username.clone(),
                date_created: now,
                modified_by: username.clone(),
                date_modified: now,
                categories: Some(Vec::new()),
                countries: Some(Vec::new()),
                languages: Some(Vec::new()),
                skills: Some(Vec::new()),
            },
        };
        let is_new = request.id.is_none();

        opportunity.title = title;
        opportunity.description = request.description;
        opportunity.type_id = opportunity_type.id;
        opportunity.type_name = opportunity_type.name;
        opportunity.organization_id = organization.id;
        opportunity.organization_name = organization.name;
        opportunity.instructions = request.instructions;
        opportunity.url = request.url;
        opportunity.zlto_reward = request.zlto_reward;
        opportunity.yoma_reward = request.yoma_reward;
        opportunity.zlto_reward_pool = request.zlto_reward_pool;
        opportunity.yoma_reward_pool = request.yoma_reward_pool;
        opportunity.verification_supported = request.verification_supported;
        opportunity.difficulty_id = difficulty.id;
        opportunity.difficulty_name = difficulty.name;
        opportunity.commitment_interval_id = interval.id;
        opportunity.commitment_interval_name = interval.name;
        opportunity.commitment_interval_count = request.commitment_interval_count;
        opportunity.participant_limit = request.participant_limit;
        opportunity.keywords = keywords;
        opportunity.date_start = start_of_day(request.date_start);
        opportunity.date_end = request.date_end.map(end_of_day);

        if let (Some(limit), Some(count)) =
            (opportunity.participant_limit, opportunity.participant_count)
        {
            if count > limit {
                return Err(DomainError::Validation(format!(
                    "Participant limit {limit} is below the current participant count {count}"
                )));
            }
        }

        if is_new {
            self.store.create(&opportunity).await?;
            info!(
                opportunity_id = %opportunity.id,
                status = %opportunity.status,
                created_by = %username,
                "Opportunity created"
            );
        } else {
            opportunity.modified_by = username.clone();
            opportunity.date_modified = now;
            self.store.update(&opportunity).await?;
            info!(
                opportunity_id = %opportunity.id,
                modified_by = %username,
                "Opportunity updated"
            );
        }

        Ok(opportunity)
    }

    /// System mutation; no user audit stamp is recorded.
    pub async fn increment_participant_count(
        &self,
        id: Uuid,
        increment: i32,
    ) -> DomainResult<Opportunity> {
        let mut opportunity = self.get_by_id(id, false).await?;
        let count = check_participant_increment(&opportunity, increment, Utc::now())?;

        opportunity.participant_count = Some(count);
        opportunity.date_modified = Utc::now();
        self.store.update(&opportunity).await?;

        info!(opportunity_id = %id, participant_count = count, "Participant count incremented");
        Ok(opportunity)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: OpportunityStatus,
        principal: &Principal,
    ) -> DomainResult<Opportunity> {
        let username = authorize(principal)?;
        let mut opportunity = self.get_by_id(id, false).await?;

        match plan_status_change(opportunity.status, status)? {
            Transition::Unchanged => Ok(opportunity),
            Transition::Apply(next) => {
                let previous = opportunity.status;
                opportunity.status = next;
                opportunity.modified_by = username.clone();
                opportunity.date_modified = Utc::now();
                self.store.update(&opportunity).await?;

                info!(
                    opportunity_id = %id,
                    from = %previous,
                    to = %next,
                    modified_by = %username,
                    "Opportunity status changed"
                );
                Ok(opportunity)
            }
        }
    }

    /// Resolves every id against its reference table before any link is written.
    async fn prepare_links(
        &self,
        id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
        principal: &Principal,
    ) -> DomainResult<Vec<Uuid>> {
        authorize(principal)?;
        if ids.is_empty() {
            return Err(DomainError::ArgumentNull(ids_argument(kind)));
        }

        let opportunity = self.get_by_id(id, false).await?;
        ensure_updatable(opportunity.status)?;

        let ids = distinct(ids.iter().copied());
        for &item in &ids {
            self.lookups.get_by_id(kind.lookup_kind(), item).await?;
        }
        Ok(ids)
    }

    /// Links the opportunity to every id; existing links are left alone.
    pub async fn assign(
        &self,
        id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
        principal: &Principal,
    ) -> DomainResult<Opportunity> {
        let ids = self.prepare_links(id, kind, ids, principal).await?;
        let added = self.store.add_links(id, kind, &ids).await?;

        info!(
            opportunity_id = %id,
            kind = kind.plural(),
            requested = ids.len(),
            added,
            "Opportunity links assigned"
        );
        self.get_by_id(id, true).await
    }

    /// Removes links to every id; ids without a link are skipped.
    pub async fn remove(
        &self,
        id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
        principal: &Principal,
    ) -> DomainResult<Opportunity> {
        let ids = self.prepare_links(id, kind, ids, principal).await?;
        let removed = self.store.remove_links(id, kind, &ids).await?;

        info!(
            opportunity_id = %id,
            kind = kind.plural(),
            requested = ids.len(),
            removed,
            "Opportunity links removed"
        );
        self.get_by_id(id, true).await
    }

    /// Expires every Active/Inactive opportunity whose end date has passed.
    ///
    /// Works in batches until a batch comes back empty and returns the number
    /// expired. A failed update stops the sweep; earlier updates stay applied.
    pub async fn process_expiration(&self, batch_size: u32) -> DomainResult<u64> {
        if batch_size == 0 {
            return Err(DomainError::Validation(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        let mut expired = 0u64;
        loop {
            let now = Utc::now();
            let batch = self.store.find_expirable(now, batch_size).await?;
            if batch.is_empty() {
                break;
            }

            for mut item in batch {
                if let Transition::Apply(next) = plan_expiration(&item, now)? {
                    item.status = next;
                    item.date_modified = now;
                    self.store.update(&item).await?;
                    expired += 1;
                    info!(opportunity_id = %item.id, date_end = ?item.date_end, "Opportunity expired");
                }
            }
        }
        Ok(expired)
    }

    /// Hands Active/Inactive opportunities ending within the next
    /// `interval_days` to the notifier, one batch at a time.
    pub async fn expiration_notifications(
        &self,
        notifier: &dyn ExpirationNotifier,
        interval_days: u32,
        batch_size: u32,
    ) -> DomainResult<u64> {
        if batch_size == 0 {
            return Err(DomainError::Validation(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        let now = Utc::now();
        let from = start_of_day(now);
        let to = from + Duration::days(i64::from(interval_days));

        let mut notified = 0u64;
        let mut number = 1u32;
        loop {
            let page = Page {
                number,
                size: batch_size,
            };
            let items = self.store.find_expiring_between(from, to, page).await?;
            if items.is_empty() {
                break;
            }

            let batch: Vec<ExpiringOpportunity> = items.iter().map(ExpiringOpportunity::from).collect();
            match notifier.notify_expiring(&batch).await {
                NotificationResult::Sent => notified += batch.len() as u64,
                NotificationResult::Skipped => {}
                NotificationResult::Failed(reason) => {
                    warn!(count = batch.len(), reason = %reason, "Expiration notification failed");
                }
            }

            if items.len() < batch_size as usize {
                break;
            }
            number += 1;
        }
        Ok(notified)
    }
}
