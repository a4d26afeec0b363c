use tracing::{debug, info};

use crate::domain::Group;
use crate::storage::{GroupOverview, Repository};

use super::{AppError, GroupSession};

/// Application service owning the database connection.
/// Groups are worked on through the `GroupSession` it hands out.
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Close the database. Sessions opened from this service stop persisting.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    /// Create a new group with its initial members and open it.
    pub async fn create_group(
        &self,
        name: &str,
        members: &[String],
    ) -> Result<GroupSession<'_>, AppError> {
        let mut group = Group::new(name)?;
        for member in members {
            group.add_member(member)?;
        }

        if self.repo.group_exists(group.name()).await? {
            return Err(AppError::GroupAlreadyExists(group.name().to_string()));
        }

        self.repo
            .create_group_with_members(group.name(), group.members())
            .await?;
        info!(group = group.name(), members = group.members().len(), "group created");

        Ok(GroupSession::new(&self.repo, group))
    }

    /// Load an existing group with its members and expenses.
    pub async fn open_group(&self, name: &str) -> Result<GroupSession<'_>, AppError> {
        if !self.repo.group_exists(name).await? {
            return Err(AppError::GroupNotFound(name.to_string()));
        }

        let members = self.repo.load_members(name).await?;
        let expenses = self.repo.load_expenses(name).await?;
        debug!(
            group = name,
            members = members.len(),
            expenses = expenses.len(),
            "group loaded"
        );

        let group = Group::restore(name, members, expenses)?;
        Ok(GroupSession::new(&self.repo, group))
    }

    /// List every stored group.
    pub async fn list_groups(&self) -> Result<Vec<GroupOverview>, AppError> {
        Ok(self.repo.list_groups().await?)
    }
}
