use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estatepay::config::Config;
use estatepay::modules::gateways::{self, PaymentGateway, PaystackClient};
use estatepay::modules::health;
use estatepay::modules::payments::controllers::{payment_controller, webhook_controller};
use estatepay::modules::payments::repositories::{
    InstallmentRepository, PaymentRepository, StoredMethodRepository,
};
use estatepay::modules::payments::services::{
    AutoDebitScheduler, LogReminderNotifier, PaymentProcessor, SettlementService,
    SubjectEffectApplier,
};
use estatepay::modules::properties::repositories::{PropertyRepository, RentalRepository};
use estatepay::modules::users::repositories::{BankAccountRepository, UserRepository};
use estatepay::modules::wallets::controllers::wallet_controller;
use estatepay::modules::wallets::repositories::WalletRepository;
use estatepay::modules::wallets::services::WalletService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estatepay=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting EstatePay settlement service");
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let gateway: Arc<dyn PaymentGateway> = Arc::new(
        PaystackClient::new(config.gateway.clone()).expect("Failed to build gateway client"),
    );

    let user_repo = UserRepository::new(db_pool.clone());
    let bank_account_repo = BankAccountRepository::new(db_pool.clone());
    let property_repo = PropertyRepository::new(db_pool.clone());
    let rental_repo = RentalRepository::new();
    let wallet_repo = WalletRepository::new(db_pool.clone());
    let payment_repo = PaymentRepository::new(db_pool.clone());
    let installment_repo = InstallmentRepository::new(db_pool.clone());
    let stored_method_repo = StoredMethodRepository::new(db_pool.clone());

    let wallet_service = WalletService::new(wallet_repo);
    let effects = SubjectEffectApplier::new(property_repo.clone(), rental_repo);

    let settlement = Arc::new(SettlementService::new(
        gateway.clone(),
        payment_repo.clone(),
        installment_repo.clone(),
        stored_method_repo.clone(),
        user_repo.clone(),
        wallet_service.clone(),
        effects.clone(),
    ));

    let processor = PaymentProcessor::new(
        gateway.clone(),
        user_repo.clone(),
        property_repo,
        bank_account_repo,
        wallet_service.clone(),
        payment_repo,
        effects,
    );

    let scheduler = Arc::new(AutoDebitScheduler::new(
        installment_repo,
        stored_method_repo,
        gateway.clone(),
        settlement.clone(),
        Arc::new(LogReminderNotifier),
    ));
    tokio::spawn(scheduler.start());

    let settlement_data = web::Data::from(settlement);
    let processor_data = web::Data::new(processor);
    let gateway_data = web::Data::from(gateway);
    let wallet_service_data = web::Data::new(wallet_service);
    let user_repo_data = web::Data::new(user_repo);

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(settlement_data.clone())
            .app_data(processor_data.clone())
            .app_data(gateway_data.clone())
            .app_data(wallet_service_data.clone())
            .app_data(user_repo_data.clone())
            .configure(health::controllers::health_controller::configure)
            .configure(payment_controller::configure)
            .configure(webhook_controller::configure)
            .configure(wallet_controller::configure)
            .configure(gateways::controllers::bank_controller::configure)
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
