use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use events::PointerCell;
use services::{
    create_pointer_backend, create_touch_listener, create_window_backend, FocusGuard,
    PointerTracker,
};

#[derive(Parser, Debug)]
#[command(name = "touchguard-rust")]
#[command(about = "Утилита для восстановления фокуса окна после касаний тачскрина")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "touchguard.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    info!("Запуск Touchguard Rust v{}", env!("CARGO_PKG_VERSION"));

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Проверка прав доступа
    utils::permissions::check_permissions()?;

    // Инициализация компонентов: единые бэкенды окна и курсора для всех сервисов
    let window_backend = create_window_backend(args.dry_run)?;
    let pointer_backend = create_pointer_backend(args.dry_run)?;
    let pointer_cell = Arc::new(PointerCell::new());

    let focus_guard = Arc::new(FocusGuard::new(
        config.clone(),
        window_backend,
        pointer_backend.clone(),
        pointer_cell.clone(),
    ));

    let (stop_tx, stop_rx) = watch::channel(false);
    let pointer_tracker =
        PointerTracker::new(config.clone(), pointer_backend, pointer_cell, stop_rx);
    let touch_listener = create_touch_listener(config.clone(), focus_guard.clone(), args.dry_run)?;

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let tracker_handle = tokio::spawn(async move {
        if let Err(e) = pointer_tracker.run().await {
            error!("Ошибка в PointerTracker: {}", e);
        }
    });
    let listener_handle = tokio::spawn(async move {
        if let Err(e) = touch_listener.run().await {
            error!("Ошибка в TouchListener: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Останавливаем трекер через stop-канал, он завершится сам
    let _ = stop_tx.send(true);

    // Слушатель сидит в блокирующем чтении устройства - прерываем задачу
    listener_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = tracker_handle.await;
        let _ = listener_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("Touchguard Rust завершил работу");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
