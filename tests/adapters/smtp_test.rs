//! SMTP adapter tests against a minimal in-process SMTP server.

use herald::providers::{self_test, SmtpProvider};
use herald::{EmailParams, EmailProvider, SmtpConfig, TlsMode};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_params() -> EmailParams {
    EmailParams::builder()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .build()
        .unwrap()
}

/// Accept one connection and answer a plain SMTP session.
///
/// `rcpt_reply` is sent in response to every `RCPT TO`.
async fn start_server(rcpt_reply: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    write
                        .write_all(b"250 2.0.0 Ok: queued as ABC123\r\n")
                        .await
                        .unwrap();
                }
                continue;
            }

            let command = line.to_ascii_uppercase();
            let reply: &[u8] = if command.starts_with("EHLO") || command.starts_with("HELO") {
                b"250-localhost\r\n250 OK\r\n"
            } else if command.starts_with("MAIL FROM") || command.starts_with("RSET") {
                b"250 OK\r\n"
            } else if command.starts_with("RCPT TO") {
                rcpt_reply.as_bytes()
            } else if command.starts_with("DATA") {
                in_data = true;
                b"354 End data with <CR><LF>.<CR><LF>\r\n"
            } else if command.starts_with("QUIT") {
                let _ = write.write_all(b"221 Bye\r\n").await;
                break;
            } else {
                b"502 Command not implemented\r\n"
            };

            if write.write_all(reply).await.is_err() {
                break;
            }
        }
    });

    port
}

fn config(port: u16) -> SmtpConfig {
    SmtpConfig::new("127.0.0.1").port(port).tls(TlsMode::None)
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn accepted_message_returns_queue_id() {
    let port = start_server("250 OK\r\n").await;
    let provider = SmtpProvider::from_config(&config(port)).unwrap();

    let result = provider.send_email(&valid_params()).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.provider, "smtp");
    assert_eq!(
        result.message_id.as_deref(),
        Some("2.0.0 Ok: queued as ABC123")
    );
    assert!(result.error.is_none());
}

#[tokio::test]
async fn rejected_recipient_becomes_failed_result() {
    let port = start_server("550 5.1.1 No such user\r\n").await;
    let provider = SmtpProvider::from_config(&config(port)).unwrap();

    let result = provider.send_email(&valid_params()).await;

    assert!(!result.success);
    assert_eq!(result.provider, "smtp");
    assert!(result.message_id.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn self_test_reports_server_outcome() {
    let port = start_server("250 OK\r\n").await;

    let result = self_test(&config(port), &valid_params()).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.provider, "smtp");
    assert_eq!(
        result.message_id.as_deref(),
        Some("2.0.0 Ok: queued as ABC123")
    );
}
