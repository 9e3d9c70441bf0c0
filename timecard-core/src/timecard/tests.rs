#[cfg(test)]
mod tests {
    use crate::error::ApiError;
    use crate::timecard::ledger::{
        assign_project, clock_in, clock_out, delete_shift, edit_shift, list_shifts, shift_status,
    };
    use chrono::{DateTime, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC 3339 timestamp")
    }

    /// Test helper to create a test database pool.
    ///
    /// In a real test environment, this would use a test database.
    /// For now, this is a placeholder that would need DATABASE_URL set.
    async fn create_test_pool() -> Result<PgPool, anyhow::Error> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL not set for tests"))?;

        let pool = PgPool::connect(&database_url).await?;
        Ok(pool)
    }

    async fn seed_project(pool: &PgPool, user_id: Uuid, name: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO projects (user_id, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("project insert")
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn clock_in_then_out_closes_the_shift() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        let open = shift_status(&pool, user_id).await.expect("status");
        assert_eq!(open.map(|r| r.shift_id), Some(shift_id));

        clock_out(&pool, user_id, shift_id, instant("2024-03-04T17:00:00Z"))
            .await
            .expect("clock out");

        assert!(shift_status(&pool, user_id).await.expect("status").is_none());

        let shifts = list_shifts(&pool, user_id).await.expect("list");
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].duration.as_deref(), Some("8h 0m"));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn second_clock_in_is_rejected_while_a_shift_is_open() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        let err = clock_in(&pool, user_id, instant("2024-03-04T10:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn clock_out_at_or_before_clock_in_is_rejected() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        let err = clock_out(&pool, user_id, shift_id, instant("2024-03-04T09:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        // The shift stays open.
        assert!(shift_status(&pool, user_id).await.expect("status").is_some());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn clock_out_on_a_foreign_shift_is_not_found() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let shift_id = clock_in(&pool, owner, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        let err = clock_out(&pool, intruder, shift_id, instant("2024-03-04T17:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn edit_requires_at_least_one_field() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let err = edit_shift(&pool, user_id, Uuid::new_v4(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn edit_rejects_a_pair_that_would_invert() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");
        clock_out(&pool, user_id, shift_id, instant("2024-03-04T17:00:00Z"))
            .await
            .expect("clock out");

        // Moving the clock-in past the existing clock-out must fail.
        let err = edit_shift(
            &pool,
            user_id,
            shift_id,
            Some(instant("2024-03-04T18:00:00Z")),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn edit_can_close_an_open_shift() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        edit_shift(
            &pool,
            user_id,
            shift_id,
            None,
            Some(instant("2024-03-04T12:30:00Z")),
        )
        .await
        .expect("edit");

        let shifts = list_shifts(&pool, user_id).await.expect("list");
        assert_eq!(shifts[0].duration.as_deref(), Some("3h 30m"));
        assert!(shift_status(&pool, user_id).await.expect("status").is_none());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn assign_project_tags_both_legs() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();
        let project_id = seed_project(&pool, user_id, "Acme").await;

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");
        clock_out(&pool, user_id, shift_id, instant("2024-03-04T17:00:00Z"))
            .await
            .expect("clock out");

        assign_project(&pool, user_id, shift_id, Some(project_id))
            .await
            .expect("assign");

        let shifts = list_shifts(&pool, user_id).await.expect("list");
        assert_eq!(shifts[0].project_id, Some(project_id));
        assert_eq!(shifts[0].project_name.as_deref(), Some("Acme"));

        let out_project = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT project_id FROM clock_out_records WHERE shift_id = $1",
        )
        .bind(shift_id)
        .fetch_one(&pool)
        .await
        .expect("clock-out row");
        assert_eq!(out_project, Some(project_id));

        // Untagging clears both legs again.
        assign_project(&pool, user_id, shift_id, None)
            .await
            .expect("untag");
        let shifts = list_shifts(&pool, user_id).await.expect("list");
        assert_eq!(shifts[0].project_id, None);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn assign_project_rejects_a_foreign_project() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();
        let other_user = Uuid::new_v4();
        let foreign_project = seed_project(&pool, other_user, "Theirs").await;

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");

        let err = assign_project(&pool, user_id, shift_id, Some(foreign_project))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("project")));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn delete_removes_both_legs() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let shift_id = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");
        clock_out(&pool, user_id, shift_id, instant("2024-03-04T17:00:00Z"))
            .await
            .expect("clock out");

        delete_shift(&pool, user_id, shift_id).await.expect("delete");

        assert!(list_shifts(&pool, user_id).await.expect("list").is_empty());

        let err = delete_shift(&pool, user_id, shift_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn a_closed_shift_allows_a_new_clock_in() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let user_id = Uuid::new_v4();

        let first = clock_in(&pool, user_id, instant("2024-03-04T09:00:00Z"))
            .await
            .expect("clock in");
        clock_out(&pool, user_id, first, instant("2024-03-04T12:00:00Z"))
            .await
            .expect("clock out");

        let second = clock_in(&pool, user_id, instant("2024-03-04T13:00:00Z"))
            .await
            .expect("second clock in");
        assert_ne!(first, second);

        let shifts = list_shifts(&pool, user_id).await.expect("list");
        assert_eq!(shifts.len(), 2);
        // Newest first.
        assert_eq!(shifts[0].shift_id, second);
    }
}
