pub mod domain;
pub mod shared;
pub mod system;
pub mod transport;
pub mod usecases;

use domain::a001_payment::Operator;
use domain::a002_order::OrdersCache;
use shared::airtable::AirtableClient;
use std::sync::Arc;
use system::access::AccessList;
use tokio::io::AsyncBufReadExt;
use transport::console::{parse_line, ConsoleTransport};
use usecases::u001_resolve_order::OrderResolver;
use usecases::u002_payment_dialog::{ConversationController, Incoming};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;
    tracing::info!("Запуск бота...");

    let config = shared::config::load_config()?;

    let client = Arc::new(AirtableClient::new(&config.airtable)?);
    let cache_path = shared::config::get_cache_path(&config);
    tracing::info!("Кэш заказов: {}", cache_path.display());
    let cache = Arc::new(OrdersCache::new(
        client.clone(),
        cache_path,
        chrono::Duration::hours(config.cache.max_age_hours),
    ));

    let access = AccessList::new(config.access.authorized_users.iter().copied());
    if access.is_empty() {
        tracing::warn!("Список authorized_users пуст: все операторы получат отказ");
    }

    // В консоли работает первый оператор из списка доступа
    let operator = Operator {
        id: config.access.authorized_users.first().copied().unwrap_or(0),
        first_name: std::env::var("USER").unwrap_or_else(|_| "Оператор".to_string()),
        last_name: None,
    };

    let controller = ConversationController::new(
        Arc::new(ConsoleTransport::new()),
        Arc::new(OrderResolver::new(cache)),
        client,
        access,
    );

    tracing::info!("Консольный режим: /start, /cancel, file:<url>, pick:<данные>");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(stimulus) = parse_line(&line) else {
            continue;
        };
        let incoming = Incoming {
            chat_id: operator.id,
            operator: operator.clone(),
            stimulus,
        };
        if let Err(e) = controller.handle(incoming).await {
            tracing::error!("Ошибка обработки сообщения: {}", e);
        }
    }

    tracing::info!("Ввод завершён, бот остановлен");
    Ok(())
}
