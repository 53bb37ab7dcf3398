//! Task operations against an in-memory transport
//!
//! Verifies the verb, path and payload of every task endpoint and the
//! conversion of responses into typed tasks.

mod common;

use chrono::{TimeZone, Utc};
use common::{Call, RecordingTransport};
use podio_tasks::{Error, MappingError, RequestOptions, Task};
use serde_json::{json, Value};

mod create_and_read {
    use super::*;

    #[tokio::test]
    async fn test_create_posts_attributes_and_hydrates() {
        let transport = RecordingTransport::new().respond_json(json!({
            "task_id": 501,
            "text": "Call supplier",
            "created_on": "2024-01-10 08:15:00"
        }));

        let attributes = json!({"text": "Call supplier"});
        let task = Task::create(&transport, &attributes, &RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(
            transport.last_call(),
            Call {
                method: "POST",
                path: "/task/".to_string(),
                payload: Some(attributes),
            }
        );
        assert_eq!(task.id(), Some(501));
        assert_eq!(task.created_on(), Some(Utc.with_ymd_and_hms(2024, 1, 10, 8, 15, 0).unwrap()));
    }

    #[tokio::test]
    async fn test_create_appends_options() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 1}));
        let options = RequestOptions::new().silent(true).hook(false);

        Task::create(&transport, &json!({}), &options).await.unwrap();

        assert_eq!(transport.last_call().path, "/task/?silent=1&hook=false");
    }

    #[tokio::test]
    async fn test_create_for_reference() {
        let transport = RecordingTransport::new().respond_json(json!({
            "task_id": 77,
            "ref": {"type": "item", "id": 12}
        }));

        let task = Task::create_for(&transport, "item", 12, &json!({"text": "Follow up"}), &RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.last_call().method, "POST");
        assert_eq!(transport.last_call().path, "/task/item/12/");
        assert_eq!(task.reference().unwrap().string("type"), Some("item"));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 9, "status": "active"}));

        let task = Task::get(&transport, 9).await.unwrap();

        assert_eq!(transport.last_call().method, "GET");
        assert_eq!(transport.last_call().path, "/task/9");
        assert_eq!(transport.last_call().payload, None);
        assert_eq!(task.status(), Some("active"));
        assert!(!task.as_resource().is_set("text"));
    }

    #[tokio::test]
    async fn test_get_all_preserves_order_and_forwards_filters() {
        let transport = RecordingTransport::new().respond_json(json!([
            {"task_id": 30},
            {"task_id": 10},
            {"task_id": 20}
        ]));
        let filters = json!({"completed": false, "responsible": 0});

        let tasks = Task::get_all(&transport, &filters).await.unwrap();

        let ids: Vec<_> = tasks.iter().filter_map(Task::id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(transport.last_call().path, "/task/");
        assert_eq!(transport.last_call().payload, Some(filters));
    }

    #[tokio::test]
    async fn test_malformed_datetime_in_response() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 9, "due_on": "not-a-date"}));

        let err = Task::get(&transport, 9).await.unwrap_err();

        match err {
            Error::Mapping(MappingError::InvalidDateTime { field, value }) => {
                assert_eq!(field, "due_on");
                assert_eq!(value, "not-a-date");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

mod update_and_commands {
    use super::*;

    #[tokio::test]
    async fn test_update_puts_attributes() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 4, "text": "Renamed"}));

        let task = Task::update(&transport, 4, &json!({"text": "Renamed"}), &RequestOptions::new().silent(true))
            .await
            .unwrap();

        assert_eq!(transport.last_call().method, "PUT");
        assert_eq!(transport.last_call().path, "/task/4?silent=1");
        assert_eq!(task.text(), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_command_endpoints() {
        let transport = RecordingTransport::new();

        Task::delete(&transport, 1).await.unwrap();
        Task::delete_ref(&transport, 2).await.unwrap();
        Task::assign(&transport, 3, &json!({"responsible": 8})).await.unwrap();
        Task::complete(&transport, 4).await.unwrap();
        Task::incomplete(&transport, 5).await.unwrap();
        Task::rank(&transport, 6, &json!({"before": 7})).await.unwrap();

        let calls: Vec<_> = transport
            .calls()
            .into_iter()
            .map(|c| (c.method, c.path, c.payload))
            .collect();

        assert_eq!(
            calls,
            vec![
                ("DELETE", "/task/1".to_string(), None),
                ("DELETE", "/task/2/ref".to_string(), None),
                ("POST", "/task/3/assign".to_string(), Some(json!({"responsible": 8}))),
                ("POST", "/task/4/complete".to_string(), None),
                ("POST", "/task/5/incomplete".to_string(), None),
                ("POST", "/task/6/rank".to_string(), Some(json!({"before": 7}))),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_returns_raw_response() {
        let transport = RecordingTransport::new();
        let response = Task::delete(&transport, 1).await.unwrap();
        assert_eq!(response.status, 204);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn test_update_reference_returns_body() {
        let transport = RecordingTransport::new().respond_text("{}");

        let body = Task::update_reference(&transport, 3, &json!({"ref_type": "item", "ref_id": 5}))
            .await
            .unwrap();

        assert_eq!(body, "{}");
        assert_eq!(transport.last_call().method, "PUT");
        assert_eq!(transport.last_call().path, "/task/3/ref");
    }

    #[tokio::test]
    async fn test_count_and_ical() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        let transport = RecordingTransport::new()
            .respond_json(json!({"count": 4}))
            .respond_text(ics);

        let count = Task::count(&transport, "space", 88).await.unwrap();
        let calendar = Task::ical(&transport, 12).await.unwrap();

        assert_eq!(count, json!({"count": 4}));
        assert_eq!(calendar, ics);

        let paths: Vec<_> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["/task/space/88/count", "/calendar/task/12/ics/"]);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let transport = RecordingTransport::new().fail("API request failed: 403 Forbidden");

        let err = Task::get(&transport, 1).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), "API request failed: 403 Forbidden");
        assert_eq!(transport.calls().len(), 1);
    }
}

mod summaries {
    use super::*;

    fn summary_body() -> Value {
        json!({
            "overdue": {"tasks": [{"task_id": 1}]},
            "today": {"tasks": []},
            "other": {"tasks": [{"task_id": 2}]}
        })
    }

    #[tokio::test]
    async fn test_summary_hydrates_each_bucket() {
        let transport = RecordingTransport::new().respond_json(summary_body());

        let summary = Task::get_summary(&transport, &json!({"limit": 5})).await.unwrap();

        assert_eq!(summary.overdue.tasks.len(), 1);
        assert_eq!(summary.overdue.tasks[0].id(), Some(1));
        assert!(summary.today.tasks.is_empty());
        assert_eq!(summary.other.tasks[0].id(), Some(2));
        assert!(summary.extra.is_empty());
        assert_eq!(summary.to_json(), summary_body());
        assert_eq!(transport.last_call().payload, Some(json!({"limit": 5})));
    }

    #[tokio::test]
    async fn test_summary_endpoints() {
        let transport = RecordingTransport::new()
            .respond_json(summary_body())
            .respond_json(summary_body())
            .respond_json(summary_body())
            .respond_json(summary_body())
            .respond_json(summary_body());

        Task::get_summary(&transport, &Value::Null).await.unwrap();
        Task::get_summary_personal(&transport, &Value::Null).await.unwrap();
        Task::get_summary_for_org(&transport, 11, &Value::Null).await.unwrap();
        Task::get_summary_for_space(&transport, 22, &Value::Null).await.unwrap();
        Task::get_summary_for(&transport, "item", 33, &Value::Null).await.unwrap();

        let paths: Vec<_> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec![
                "/task/summary",
                "/task/personal/summary",
                "/task/org/11/summary",
                "/task/space/22/summary",
                "/task/item/33/summary",
            ]
        );
    }

    #[tokio::test]
    async fn test_summary_keeps_null_bucket() {
        let body = json!({
            "overdue": {"tasks": [{"task_id": 1}]},
            "today": null,
            "other": {"tasks": []}
        });
        let transport = RecordingTransport::new().respond_json(body.clone());

        let summary = Task::get_summary(&transport, &Value::Null).await.unwrap();

        assert_eq!(summary.overdue.tasks[0].id(), Some(1));
        assert_eq!(summary.to_json()["today"], Value::Null);
        assert_eq!(summary.to_json(), body);
    }

    #[tokio::test]
    async fn test_summary_rejects_non_object() {
        let transport = RecordingTransport::new().respond_json(json!([1, 2]));
        let err = Task::get_summary(&transport, &Value::Null).await.unwrap_err();
        assert!(matches!(err, Error::Mapping(MappingError::NotAnObject { .. })));
    }
}

mod instance_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_save_transient_creates_and_adopts_id() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 900, "text": "Draft budget"}));

        let mut task = Task::new();
        task.set_text("Draft budget").set_responsible(15);
        task.save(&transport).await.unwrap();

        assert_eq!(task.id(), Some(900));
        assert!(task.is_persisted());
        assert_eq!(
            transport.last_call(),
            Call {
                method: "POST",
                path: "/task/".to_string(),
                payload: Some(json!({"text": "Draft budget", "responsible": 15})),
            }
        );
    }

    #[tokio::test]
    async fn test_save_persisted_updates_and_keeps_id() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 555, "text": "Renamed"}));

        let mut task = Task::from_json(&json!({"task_id": 42, "text": "Original"})).unwrap();
        task.set_text("Renamed");
        let saved = task.save(&transport).await.unwrap();

        assert_eq!(saved.id(), Some(42));
        assert_eq!(transport.last_call().method, "PUT");
        assert_eq!(transport.last_call().path, "/task/42");
        assert_eq!(
            transport.last_call().payload,
            Some(json!({"task_id": 42, "text": "Renamed"}))
        );
    }

    #[tokio::test]
    async fn test_save_persisted_accepts_empty_response() {
        let transport = RecordingTransport::new();

        let mut task = Task::from_json(&json!({"task_id": 42, "text": "Original"})).unwrap();
        task.set_text("Renamed");
        let saved = task.save(&transport).await.unwrap();

        assert_eq!(saved.id(), Some(42));
        assert_eq!(saved.text(), Some("Renamed"));
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(
            transport.last_call(),
            Call {
                method: "PUT",
                path: "/task/42".to_string(),
                payload: Some(json!({"task_id": 42, "text": "Renamed"})),
            }
        );
    }

    #[tokio::test]
    async fn test_save_create_without_identifier_fails() {
        let transport = RecordingTransport::new().respond_json(json!({"text": "Draft budget"}));

        let mut task = Task::new();
        task.set_text("Draft budget");
        let err = task.save(&transport).await.unwrap_err();

        assert!(matches!(err, Error::Mapping(MappingError::MissingIdentifier { .. })));
        assert!(!task.is_persisted());
        assert_eq!(transport.last_call().method, "POST");
    }

    #[tokio::test]
    async fn test_save_returns_same_instance() {
        let transport = RecordingTransport::new().respond_json(json!({"task_id": 3}));

        let mut task = Task::new();
        task.set_text("Chained");
        let text = task.save(&transport).await.unwrap().set_description("after save").text().map(str::to_string);

        assert_eq!(text.as_deref(), Some("Chained"));
        assert_eq!(task.description(), Some("after save"));
    }

    #[tokio::test]
    async fn test_instance_commands_use_identifier() {
        let transport = RecordingTransport::new().respond_text("{}");
        let task = Task::from_json(&json!({"task_id": 8})).unwrap();

        task.completed(&transport).await.unwrap();
        task.incompleted(&transport).await.unwrap();
        task.destroy(&transport).await.unwrap();

        let paths: Vec<_> = transport.calls().into_iter().map(|c| (c.method, c.path)).collect();
        assert_eq!(
            paths,
            vec![
                ("POST", "/task/8/complete".to_string()),
                ("POST", "/task/8/incomplete".to_string()),
                ("DELETE", "/task/8".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_private_sends_flag() {
        let transport = RecordingTransport::new().respond_text("");
        let task = Task::from_json(&json!({"task_id": 8})).unwrap();

        task.update_private(&transport, true, &RequestOptions::new().hook(false))
            .await
            .unwrap();

        assert_eq!(
            transport.last_call(),
            Call {
                method: "PUT",
                path: "/task/8/private?hook=false".to_string(),
                payload: Some(json!({"private": true})),
            }
        );
    }

    #[tokio::test]
    async fn test_transient_task_rejects_commands() {
        let transport = RecordingTransport::new();
        let task = Task::new();

        assert!(matches!(task.completed(&transport).await, Err(Error::NotPersisted("task"))));
        assert!(matches!(task.incompleted(&transport).await, Err(Error::NotPersisted(_))));
        assert!(matches!(task.destroy(&transport).await, Err(Error::NotPersisted(_))));
        assert!(matches!(
            task.update_private(&transport, false, &RequestOptions::default()).await,
            Err(Error::NotPersisted(_))
        ));
        assert!(transport.calls().is_empty());
    }
}
