//! 服务层测试，使用内存仓储和固定结果的通知器

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reminder_core::models::{Schedule, ScheduleStatus, Task};
use reminder_core::services::{CreateTaskParams, NotifyService, TaskService};
use reminder_core::traits::{Notifier, ScheduleRepository, TaskRepository};
use reminder_core::{ReminderError, ReminderResult};

#[derive(Default)]
struct InMemoryTaskRepository {
    tasks: Mutex<HashMap<i64, Task>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> ReminderResult<Task> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let mut stored = task.clone();
        stored.id = *next_id;
        self.tasks.lock().unwrap().insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Task>> {
        Ok(self.tasks.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> ReminderResult<Vec<Task>> {
        Ok(self.tasks.lock().unwrap().values().cloned().collect())
    }

    async fn update(&self, task: &Task) -> ReminderResult<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if !tasks.contains_key(&task.id) {
            return Err(ReminderError::task_not_found(task.id));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> ReminderResult<()> {
        self.tasks
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ReminderError::task_not_found(id))
    }
}

#[derive(Default)]
struct InMemoryScheduleRepository {
    schedules: Mutex<HashMap<i64, Schedule>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn create(&self, schedule: &Schedule) -> ReminderResult<Schedule> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let mut stored = schedule.clone();
        stored.id = *next_id;
        self.schedules
            .lock()
            .unwrap()
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Schedule>> {
        Ok(self.schedules.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_task_id(&self, task_id: i64) -> ReminderResult<Vec<Schedule>> {
        let mut found: Vec<Schedule> = self
            .schedules
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.notify_at);
        Ok(found)
    }

    async fn get_due(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> ReminderResult<Vec<Schedule>> {
        let mut due: Vec<Schedule> = self
            .schedules
            .lock()
            .unwrap()
            .values()
            .filter(|s| {
                s.status == ScheduleStatus::Created && s.notify_at.with_timezone(&Utc) <= now
            })
            .cloned()
            .collect();
        due.sort_by_key(|s| s.notify_at);
        if let Some(limit) = limit {
            due.truncate(limit as usize);
        }
        Ok(due)
    }

    async fn update_status(
        &self,
        id: i64,
        from: ScheduleStatus,
        to: ScheduleStatus,
        done_at: Option<DateTime<Utc>>,
    ) -> ReminderResult<()> {
        let mut schedules = self.schedules.lock().unwrap();
        let schedule = schedules
            .get_mut(&id)
            .ok_or(ReminderError::ScheduleNotFound { id })?;
        if schedule.status != from {
            return Err(ReminderError::InvalidState {
                from: schedule.status,
                to,
            });
        }
        schedule.status = to;
        schedule.updated_at = Utc::now();
        if let Some(done_at) = done_at {
            schedule.done_at = Some(done_at);
        }
        Ok(())
    }
}

struct StaticNotifier {
    should_fail: AtomicBool,
    notified: Mutex<Vec<i64>>,
}

impl StaticNotifier {
    fn new(should_fail: bool) -> Self {
        Self {
            should_fail: AtomicBool::new(should_fail),
            notified: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for StaticNotifier {
    async fn notify(&self, _task: &Task, schedule: &Schedule) -> ReminderResult<()> {
        self.notified.lock().unwrap().push(schedule.id);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ReminderError::Notification("连接被拒绝".to_string()));
        }
        Ok(())
    }
}

struct Fixture {
    task_repo: Arc<InMemoryTaskRepository>,
    schedule_repo: Arc<InMemoryScheduleRepository>,
    notifier: Arc<StaticNotifier>,
    task_service: TaskService,
    notify_service: NotifyService,
}

fn fixture(should_fail: bool) -> Fixture {
    let task_repo = Arc::new(InMemoryTaskRepository::default());
    let schedule_repo = Arc::new(InMemoryScheduleRepository::default());
    let notifier = Arc::new(StaticNotifier::new(should_fail));
    let task_service = TaskService::new(task_repo.clone(), schedule_repo.clone());
    let notify_service = NotifyService::new(
        task_repo.clone(),
        schedule_repo.clone(),
        notifier.clone(),
    );
    Fixture {
        task_repo,
        schedule_repo,
        notifier,
        task_service,
        notify_service,
    }
}

fn recurring_params(start_time: &str) -> CreateTaskParams {
    CreateTaskParams {
        name: "站会提醒".to_string(),
        description: Some("每 20 分钟提醒一次".to_string()),
        start_time: start_time.to_string(),
        end_time: None,
        repeat_interval: Some("20m".to_string()),
        repeat_days: vec![],
    }
}

#[tokio::test]
async fn test_create_task_materializes_first_schedule() {
    let fx = fixture(false);

    let task = fx
        .task_service
        .create_task(recurring_params("2025-07-20T10:38:23+07:00"))
        .await
        .unwrap();
    assert!(task.id > 0);

    let schedules = fx.schedule_repo.get_by_task_id(task.id).await.unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].status, ScheduleStatus::Created);
    assert_eq!(schedules[0].notify_at, task.start_time);
}

#[tokio::test]
async fn test_create_task_invalid_input_leaves_nothing_behind() {
    let fx = fixture(false);

    let mut params = recurring_params("2025-07-20T10:38:23+07:00");
    params.repeat_days = vec![7];
    assert!(fx.task_service.create_task(params).await.is_err());

    assert!(fx.task_repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_due_delivers_and_creates_next_occurrence() {
    let fx = fixture(false);
    let task = fx
        .task_service
        .create_task(recurring_params("2025-07-20T10:38:23+07:00"))
        .await
        .unwrap();

    let attempted = fx.notify_service.run_due(Utc::now()).await.unwrap();
    assert_eq!(attempted, 1);
    assert_eq!(*fx.notifier.notified.lock().unwrap(), vec![1]);

    let schedules = fx.schedule_repo.get_by_task_id(task.id).await.unwrap();
    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0].status, ScheduleStatus::Succeeded);
    assert!(schedules[0].done_at.is_some());
    // 下一条提醒从本次提醒时间推进一个间隔
    assert_eq!(
        schedules[1].notify_at.to_rfc3339(),
        "2025-07-20T10:58:23+07:00"
    );
    assert_eq!(schedules[1].status, ScheduleStatus::Created);
}

#[tokio::test]
async fn test_run_due_failure_marks_failed_and_still_advances() {
    let fx = fixture(true);
    let task = fx
        .task_service
        .create_task(recurring_params("2025-07-20T10:38:23+07:00"))
        .await
        .unwrap();

    let attempted = fx.notify_service.run_due(Utc::now()).await.unwrap();
    assert_eq!(attempted, 1);

    let schedules = fx.schedule_repo.get_by_task_id(task.id).await.unwrap();
    assert_eq!(schedules[0].status, ScheduleStatus::Failed);
    assert!(schedules[0].done_at.is_some());
    // 投递失败不影响后续提醒的生成
    assert_eq!(schedules[1].status, ScheduleStatus::Created);
}

#[tokio::test]
async fn test_run_due_ignores_future_schedules() {
    let fx = fixture(false);
    fx.task_service
        .create_task(recurring_params("2099-01-01T09:00:00+07:00"))
        .await
        .unwrap();

    let attempted = fx.notify_service.run_due(Utc::now()).await.unwrap();
    assert_eq!(attempted, 0);
    assert!(fx.notifier.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_recurring_task_gets_single_occurrence() {
    let fx = fixture(false);
    let mut params = recurring_params("2025-07-20T10:38:23+07:00");
    params.repeat_interval = None;
    let task = fx.task_service.create_task(params).await.unwrap();

    fx.notify_service.run_due(Utc::now()).await.unwrap();

    let schedules = fx.schedule_repo.get_by_task_id(task.id).await.unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].status, ScheduleStatus::Succeeded);
}

#[tokio::test]
async fn test_deleted_task_marks_schedule_failed() {
    let fx = fixture(false);
    let task = fx
        .task_service
        .create_task(recurring_params("2025-07-20T10:38:23+07:00"))
        .await
        .unwrap();
    fx.task_service.delete_task(task.id).await.unwrap();

    let attempted = fx.notify_service.run_due(Utc::now()).await.unwrap();
    assert_eq!(attempted, 0);

    let schedule = fx.schedule_repo.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(schedule.status, ScheduleStatus::Failed);
    assert!(fx.notifier.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_only_works_once() {
    let fx = fixture(false);
    fx.task_service
        .create_task(recurring_params("2099-01-01T09:00:00+07:00"))
        .await
        .unwrap();

    fx.notify_service.cancel(1).await.unwrap();
    let schedule = fx.notify_service.get_schedule(1).await.unwrap();
    assert_eq!(schedule.status, ScheduleStatus::Canceled);
    assert!(schedule.done_at.is_some());

    let err = fx.notify_service.cancel(1).await.unwrap_err();
    assert!(matches!(err, ReminderError::InvalidState { .. }));

    let err = fx.notify_service.cancel(999).await.unwrap_err();
    assert!(matches!(err, ReminderError::ScheduleNotFound { id: 999 }));
}

#[tokio::test]
async fn test_update_task_revalidates_as_a_whole() {
    let fx = fixture(false);
    let task = fx
        .task_service
        .create_task(recurring_params("2025-07-20T10:38:23+07:00"))
        .await
        .unwrap();

    // 结束时间容不下一次重复间隔，整体更新被拒绝
    let err = fx
        .task_service
        .update_task(
            task.id,
            reminder_core::services::UpdateTaskParams {
                end_time: Some("2025-07-20T10:48:23+07:00".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReminderError::InvalidInput(_)));

    let unchanged = fx.task_service.get_task(task.id).await.unwrap();
    assert!(unchanged.end_time.is_none());

    // 合法更新保留创建时间并重排星期
    let updated = fx
        .task_service
        .update_task(
            task.id,
            reminder_core::services::UpdateTaskParams {
                repeat_days: Some(vec![5, 1, 3]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.repeat_days, vec![1, 3, 5]);
    assert_eq!(updated.created_at, task.created_at);
}
