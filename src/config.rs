use clap::Parser;

/// アプリケーション設定
///
/// コマンドライン引数または環境変数から読み込む。
#[derive(Debug, Clone, Parser)]
#[command(name = "community-library", about = "Community library lending service")]
pub struct AppConfig {
    /// PostgreSQLの接続URL（未指定ならインメモリのストアで起動する）
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// 待ち受けポート
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// コネクションプールの最大接続数
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// カタログが空のとき見本の蔵書を登録するか
    #[arg(long, env = "SEED_DEFAULTS", default_value_t = true, action = clap::ArgAction::Set)]
    pub seed_defaults: bool,
}

impl AppConfig {
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
