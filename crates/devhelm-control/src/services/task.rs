// Task service: work items, feedback and questions for one agent
// Decision: Every call is scoped to the calling agent; other agents' tasks are not found

use devhelm_core::{ControlError, Feedback, Question, Result, Task, DEFAULT_TASK_STATUS};
use devhelm_storage::{CreateFeedbackRow, CreateQuestionRow, CreateTaskRow, StorageBackend};
use uuid::Uuid;

pub struct TaskService {
    db: StorageBackend,
}

impl TaskService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn list(&self, agent_id: Uuid) -> Result<Vec<Task>> {
        let rows = self.db.list_tasks_for_agent(agent_id).await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub async fn create(
        &self,
        agent_id: Uuid,
        jira_ticket_id: String,
        github_pull_request_id: Option<String>,
    ) -> Result<Task> {
        let row = self
            .db
            .create_task(CreateTaskRow {
                agent_id,
                jira_ticket_id,
                status: DEFAULT_TASK_STATUS.to_string(),
                github_pull_request_id,
            })
            .await?;

        tracing::info!(task_id = %row.id, %agent_id, "Created task");
        Ok(Task::from(row))
    }

    pub async fn get(&self, agent_id: Uuid, task_id: Uuid) -> Result<Task> {
        match self.db.get_task(task_id).await? {
            Some(row) if row.agent_id == agent_id => Ok(Task::from(row)),
            _ => Err(ControlError::TaskNotFound(task_id)),
        }
    }

    /// Free-text status; no transitions are enforced
    pub async fn update_status(&self, agent_id: Uuid, task_id: Uuid, status: &str) -> Result<Task> {
        self.get(agent_id, task_id).await?;
        let row = self
            .db
            .update_task_status(task_id, status)
            .await?
            .ok_or(ControlError::TaskNotFound(task_id))?;

        tracing::info!(%task_id, status, "Task status changed");
        Ok(Task::from(row))
    }

    pub async fn add_feedback(
        &self,
        agent_id: Uuid,
        task_id: Uuid,
        feedback: String,
        github_comment_id: Option<String>,
    ) -> Result<Feedback> {
        self.get(agent_id, task_id).await?;
        let row = self
            .db
            .create_feedback(CreateFeedbackRow {
                task_id,
                github_comment_id,
                status: DEFAULT_TASK_STATUS.to_string(),
                feedback,
            })
            .await?;
        Ok(Feedback::from(row))
    }

    pub async fn list_feedback(&self, agent_id: Uuid, task_id: Uuid) -> Result<Vec<Feedback>> {
        self.get(agent_id, task_id).await?;
        let rows = self.db.list_feedback_for_task(task_id).await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    pub async fn add_question(&self, agent_id: Uuid, task_id: Uuid, question: String) -> Result<Question> {
        self.get(agent_id, task_id).await?;
        let row = self
            .db
            .create_question(CreateQuestionRow {
                task_id,
                question,
                status: DEFAULT_TASK_STATUS.to_string(),
            })
            .await?;
        Ok(Question::from(row))
    }

    pub async fn list_questions(&self, agent_id: Uuid, task_id: Uuid) -> Result<Vec<Question>> {
        self.get(agent_id, task_id).await?;
        let rows = self.db.list_questions_for_task(task_id).await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }
}
