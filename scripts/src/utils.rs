use anyhow::Context;
use wa_lead_tracker::{config::AppConfig, repo, utils};

/// Renders `file_name` from the migrations directory `dir`
pub fn render_migration(dir: &str, file_name: &str) -> anyhow::Result<String> {
    let mut tera = tera::Tera::new(&format!("{}/**/*.sql", dir.trim_end_matches('/')))?;
    tera.autoescape_on(vec![".sql"]);

    tera.render(file_name, &tera::Context::new())
        .with_context(|| format!("cant render migration {file_name} from {dir}"))
}

pub async fn run_migrations(app_config: &AppConfig, dir: &str, file_name: &str) -> anyhow::Result<()> {
    let db_pool = utils::setup_sqlite_db_pool(app_config)?;
    let sql = render_migration(dir, file_name)?;

    utils::run_migrations(&db_pool, &sql).await
}

pub fn setup_repo(app_config: &AppConfig) -> anyhow::Result<repo::ImplAppRepo> {
    Ok(Box::new(repo::sqlite::SqlxSqliteRepo {
        db_pool: utils::setup_sqlite_db_pool(app_config)?,
    }))
}
