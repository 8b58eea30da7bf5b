//! CLI commands

use crate::context::AppContext;
use ledger_core::dto::AccountListResponse;
use ledger_core::{AccountStatus, AccountType, Page};
use ledger_saga::{InboundEvent, SagaConsumer};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Events buffered between the line reader and the consumer
const CHANNEL_CAPACITY: usize = 64;

/// Feed newline-delimited `InboundEvent`s from `input` through the saga
/// consumer and write one JSON result per line to `output`.
///
/// Blank lines are skipped. A line that is not a valid event cannot be
/// answered (there is no id to answer to), so it is logged and dropped.
/// Returns the number of events processed once `input` reaches EOF.
pub async fn serve<R, W>(consumer: SagaConsumer, input: R, mut output: W) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (in_tx, in_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (out_tx, mut out_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = consumer.spawn(in_rx, out_tx);

    let reader = async move {
        let mut lines = input.lines();
        let mut line_no = 0u64;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match InboundEvent::from_json(line) {
                Ok(event) => {
                    if in_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(line = line_no, "skipping malformed event: {e}"),
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    // A failed write drops `out_rx`, which stops the consumer.
    let writer = async move {
        while let Some(reply) = out_rx.recv().await {
            let mut line = reply.to_json()?;
            line.push('\n');
            output.write_all(line.as_bytes()).await?;
            output.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    };

    let (read, write) = tokio::join!(reader, writer);
    read?;
    write?;
    let processed = handle.await??;
    Ok(processed)
}

pub async fn open(
    ctx: &AppContext,
    user_id: Uuid,
    account_type: AccountType,
    currency: Option<&str>,
) -> anyhow::Result<()> {
    let account = ctx.ledger.create(user_id, account_type, currency).await?;
    print_json(&account)
}

pub async fn show(ctx: &AppContext, account: &str) -> anyhow::Result<()> {
    let account = match account.parse::<Uuid>() {
        Ok(id) => ctx.ledger.get_by_id(id).await?,
        Err(_) => ctx.ledger.get_by_account_number(account).await?,
    };
    print_json(&account)
}

pub async fn list(ctx: &AppContext, user_id: Option<Uuid>, page: Page) -> anyhow::Result<()> {
    let window = match user_id {
        Some(user_id) => ctx.ledger.list_by_user(user_id, page).await?,
        None => ctx.ledger.list_all(page).await?,
    };
    print_json(&AccountListResponse::new(window, page))
}

pub async fn deposit(ctx: &AppContext, id: Uuid, amount: Decimal) -> anyhow::Result<()> {
    let account = ctx.ledger.deposit(id, amount).await?;
    print_json(&account)
}

pub async fn withdraw(ctx: &AppContext, id: Uuid, amount: Decimal) -> anyhow::Result<()> {
    let account = ctx.ledger.withdraw(id, amount).await?;
    print_json(&account)
}

pub async fn transfer(ctx: &AppContext, from: Uuid, to: Uuid, amount: Decimal) -> anyhow::Result<()> {
    ctx.ledger.transfer(from, to, amount).await?;
    println!("Transferred {amount} from {from} to {to}");
    Ok(())
}

pub async fn set_status(ctx: &AppContext, id: Uuid, status: AccountStatus) -> anyhow::Result<()> {
    let account = if status == AccountStatus::Closed {
        ctx.ledger.close(id).await?;
        ctx.ledger.get_by_id(id).await?
    } else {
        ctx.ledger.update_status(id, status).await?
    };
    print_json(&account)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ledger_core::AccountLedger;
    use ledger_saga::OutboundEvent;
    use ledger_store::StoreConfig;
    use rust_decimal_macros::dec;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Output whose reader went away
    struct ClosedPipe;

    impl AsyncWrite for ClosedPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn context() -> (TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            store: StoreConfig::for_path(dir.path().join("ledger.db")),
            ..AppConfig::default()
        };
        let ctx = AppContext::new(config).await.unwrap();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let (_dir, ctx) = context().await;
        let user = Uuid::new_v4();
        let a = ctx.ledger.create(user, AccountType::Checking, None).await.unwrap();
        let b = ctx.ledger.create(Uuid::new_v4(), AccountType::Checking, None).await.unwrap();
        ctx.ledger.deposit(a.id, dec!(100)).await.unwrap();

        let input = format!(
            "{}\n\nnot json\n{}\n",
            serde_json::json!({
                "type": "transfer_requested",
                "transfer_id": Uuid::new_v4(),
                "reference_id": "TRX-1",
                "from_account_id": a.id,
                "to_account_id": b.id,
                "amount": "60",
                "currency": "USD",
            }),
            serde_json::json!({
                "type": "payment_requested",
                "payment_id": Uuid::new_v4(),
                "reference_id": "PAY-1",
                "account_id": a.id,
                "user_id": user,
                "payment_type": "bill",
                "amount": "50",
                "currency": "USD",
            }),
        );

        let mut output = Vec::new();
        let processed = serve(ctx.saga_consumer(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(processed, 2);

        let replies: Vec<OutboundEvent> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert!(replies[0].is_completed());
        match &replies[1] {
            OutboundEvent::PaymentResult(result) => {
                assert_eq!(result.reference_id, "PAY-1");
                assert_eq!(result.failure_reason.as_deref(), Some("insufficient_funds"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        assert_eq!(ctx.ledger.get_by_id(b.id).await.unwrap().balance, dec!(60));
    }

    #[tokio::test]
    async fn test_serve_empty_input() {
        let (_dir, ctx) = context().await;
        let mut output = Vec::new();
        let processed = serve(ctx.saga_consumer(), &b""[..], &mut output).await.unwrap();
        assert_eq!(processed, 0);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_serve_stops_when_output_fails() {
        let (_dir, ctx) = context().await;
        // Enough events to fill both channels several times over
        let line = serde_json::json!({
            "type": "payment_requested",
            "payment_id": Uuid::new_v4(),
            "reference_id": "PAY-X",
            "account_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "payment_type": "bill",
            "amount": "1",
            "currency": "USD",
        })
        .to_string();
        let input = format!("{line}\n").repeat(CHANNEL_CAPACITY * 5);

        let result = tokio::time::timeout(
            Duration::from_secs(30),
            serve(ctx.saga_consumer(), input.as_bytes(), ClosedPipe),
        )
        .await
        .expect("serve hung after its output closed");
        let err = result.unwrap_err();
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_set_status_closed_goes_through_close() {
        let (_dir, ctx) = context().await;
        let account = ctx
            .ledger
            .create(Uuid::new_v4(), AccountType::Checking, None)
            .await
            .unwrap();
        set_status(&ctx, account.id, AccountStatus::Closed).await.unwrap();
        assert_eq!(
            ctx.store().get_by_id(account.id).await.unwrap().status,
            AccountStatus::Closed
        );
    }
}
