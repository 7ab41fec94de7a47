//! tests/email_tests.rs
//! Pruebas unitarias para `EmailService` (orquestador de envíos).

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use actix_rt::test;

    use crate::errors::EmailError;
    use crate::models::email_model::{EmailStatus, Priority};
    use crate::models::tracking_model::TrackingId;
    use crate::services::email_service::EmailService;
    use crate::tests::support::{
        email_service, in_memory_store, task_request, BrokenRenderer, Outcome, ScriptedTransport,
        SERVICE_URL,
    };

    fn kinds(events: &[crate::models::tracking_model::EmailEvent]) -> Vec<EmailStatus> {
        events.iter().map(|e| e.event_type).collect()
    }

    #[test]
    async fn test_successful_send_records_pending_then_sent() {
        let store = in_memory_store();
        let transport = ScriptedTransport::new(Outcome::Accepted("msg-001".to_string()));
        let service = email_service(store.clone(), transport.clone());

        let resp = service
            .send_task_email(task_request("a@example.com", Priority::Highest))
            .await;

        assert_eq!(resp.status, EmailStatus::Sent);
        assert_eq!(resp.message_id, "msg-001");
        assert!(!resp.tracking_id.as_str().is_empty());
        assert_eq!(kinds(&resp.events), vec![EmailStatus::Pending, EmailStatus::Sent]);

        let events = store.get_events(&resp.tracking_id).await;
        assert_eq!(kinds(&events), vec![EmailStatus::Pending, EmailStatus::Sent]);
        assert_eq!(events[0].metadata.get("task_id").map(String::as_str), Some("123"));
        assert_eq!(events[1].metadata.get("message_id").map(String::as_str), Some("msg-001"));

        assert_eq!(
            service.get_email_status(&resp.tracking_id).await,
            Some(EmailStatus::Sent)
        );

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!(sent[0].subject, "Test Task Created");
        assert!(sent[0].html.contains("Test Task"));
        assert!(sent[0]
            .html
            .contains(&format!("/api/v1/tracking/{}/pixel", resp.tracking_id)));
    }

    #[test]
    async fn test_every_successful_send_reports_sent() {
        let store = in_memory_store();
        let service = email_service(
            store.clone(),
            ScriptedTransport::new(Outcome::Accepted("id".to_string())),
        );

        for priority in [
            Priority::Highest,
            Priority::High,
            Priority::Medium,
            Priority::Low,
            Priority::Lowest,
        ] {
            let resp = service
                .send_task_email(task_request("b@example.com", priority))
                .await;
            assert_eq!(
                service.get_email_status(&resp.tracking_id).await,
                Some(EmailStatus::Sent)
            );
        }
    }

    #[test]
    async fn test_transport_error_records_failed_event() {
        let store = in_memory_store();
        let service = email_service(
            store.clone(),
            ScriptedTransport::new(Outcome::Fails("connection refused".to_string())),
        );

        let resp = service
            .send_task_email(task_request("a@example.com", Priority::Medium))
            .await;

        assert_eq!(resp.status, EmailStatus::Failed);
        assert_eq!(resp.message_id, "");
        let events = store.get_events(&resp.tracking_id).await;
        assert_eq!(kinds(&events), vec![EmailStatus::Pending, EmailStatus::Failed]);
        assert!(events[1].metadata["error"].contains("connection refused"));
        assert_eq!(
            service.get_email_status(&resp.tracking_id).await,
            Some(EmailStatus::Failed)
        );
    }

    #[test]
    async fn test_missing_message_id_is_a_failure() {
        let store = in_memory_store();
        let service = email_service(store.clone(), ScriptedTransport::new(Outcome::NoMessageId));

        let resp = service
            .send_task_email(task_request("a@example.com", Priority::Low))
            .await;

        assert_eq!(resp.status, EmailStatus::Failed);
        assert_eq!(resp.message_id, "");
        let events = store.get_events(&resp.tracking_id).await;
        assert_eq!(kinds(&events), vec![EmailStatus::Pending, EmailStatus::Failed]);
        assert_eq!(events[1].metadata["error"], "no message id");
    }

    #[test]
    async fn test_render_failure_records_no_terminal_event() {
        let store = in_memory_store();
        let transport = ScriptedTransport::new(Outcome::Accepted("never".to_string()));
        let service = EmailService::new(
            store.clone(),
            Arc::new(BrokenRenderer),
            transport.clone(),
            SERVICE_URL,
        );

        let failure = service
            .try_send_task_email(task_request("a@example.com", Priority::High))
            .await
            .expect_err("render must fail");
        assert!(matches!(failure.error, EmailError::Render(_)));
        assert_eq!(
            kinds(&store.get_events(&failure.tracking_id).await),
            vec![EmailStatus::Pending]
        );
        assert!(transport.sent().is_empty(), "no debe intentar enviar");

        // La variante "infalible" lo convierte en una respuesta FAILED
        let resp = service
            .send_task_email(task_request("a@example.com", Priority::High))
            .await;
        assert_eq!(resp.status, EmailStatus::Failed);
        assert_eq!(resp.message_id, "");
        assert_eq!(kinds(&resp.events), vec![EmailStatus::Pending]);
    }

    #[test]
    async fn test_task_url_goes_through_redirect() {
        let store = in_memory_store();
        let transport = ScriptedTransport::new(Outcome::Accepted("m".to_string()));
        let service = email_service(store, transport.clone());

        let mut req = task_request("a@example.com", Priority::High);
        req.task_url = Some("https://tasks.example.com/t/1?tab=details".to_string());
        req.tags = Some(vec!["backend".to_string(), "urgent".to_string()]);
        req.metadata = Some(HashMap::from([("project".to_string(), "Apollo".to_string())]));

        let resp = service.send_task_email(req).await;
        let html = &transport.sent()[0].html;

        assert!(html.contains(&format!("/api/v1/tracking/{}/redirect?url", resp.tracking_id)));
        assert!(html.contains("https%3A%2F%2Ftasks.example.com%2Ft%2F1%3Ftab%3Ddetails"));
        assert!(html.contains("backend"));
        assert!(html.contains("urgent"));
        assert!(html.contains("Apollo"));
    }

    #[test]
    async fn test_tracking_urls() {
        let service = email_service(
            in_memory_store(),
            ScriptedTransport::new(Outcome::NoMessageId),
        );
        let id = TrackingId::from("abc");

        assert_eq!(
            service.tracking_pixel_url(&id),
            "http://localhost:8002/api/v1/tracking/abc/pixel"
        );
        assert_eq!(
            service.tracking_link(&id, "https://example.com/a b"),
            "http://localhost:8002/api/v1/tracking/abc/redirect?url=https%3A%2F%2Fexample.com%2Fa%20b"
        );
    }

    #[test]
    async fn test_status_of_unknown_id_is_absent() {
        let service = email_service(
            in_memory_store(),
            ScriptedTransport::new(Outcome::NoMessageId),
        );
        let id = TrackingId::from("does-not-exist");

        assert_eq!(service.get_email_status(&id).await, None);
        assert!(matches!(
            service.get_status_details(&id).await,
            Err(EmailError::NotFound(_))
        ));
    }

    #[test]
    async fn test_status_details() {
        let store = in_memory_store();
        let ok = email_service(
            store.clone(),
            ScriptedTransport::new(Outcome::Accepted("x".to_string())),
        );
        let resp = ok
            .send_task_email(task_request("a@example.com", Priority::High))
            .await;
        let details = ok.get_status_details(&resp.tracking_id).await.unwrap();
        let events = store.get_events(&resp.tracking_id).await;
        assert_eq!(details.status, EmailStatus::Sent);
        assert_eq!(details.sent_at, events[1].timestamp);
        assert!(details.delivered_at.is_none());
        assert!(details.error.is_none());

        let failing = email_service(
            store.clone(),
            ScriptedTransport::new(Outcome::Fails("mailbox full".to_string())),
        );
        let resp = failing
            .send_task_email(task_request("a@example.com", Priority::High))
            .await;
        let details = failing.get_status_details(&resp.tracking_id).await.unwrap();
        assert_eq!(details.status, EmailStatus::Failed);
        assert!(details.error.unwrap().contains("mailbox full"));
    }
}
