use actix_cors::Cors;
use actix_web::{get, middleware::Logger, post, web, App, HttpResponse, HttpServer};
use tracing::info;

use quicksplit::{calculate_balances, config::ServerConfig, Group, ValidationError};

#[post("/balances")]
async fn get_balance(group: web::Json<Group>) -> Result<HttpResponse, ValidationError> {
    let group = group.into_inner();
    let balances = calculate_balances(&group)?;
    Ok(HttpResponse::Ok().json(balances))
}

#[post("/groups/summary")]
async fn get_summary(
    config: web::Data<ServerConfig>,
    group: web::Json<Group>,
) -> Result<HttpResponse, ValidationError> {
    let mut summary = group.into_inner().summary()?;
    summary
        .currency
        .get_or_insert_with(|| config.default_currency.clone());
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_balance)
        .service(get_summary)
        .service(health);
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quicksplit=info,actix_web=info"));

    if std::env::var("QUICKSPLIT_LOG_JSON").is_ok() {
        fmt().json().with_env_filter(env_filter).with_target(true).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = ServerConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    info!(host = %config.host, port = config.port, "Starting quicksplit");

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(config.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
