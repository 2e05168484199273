use blog_core::{AppCredential, UploadPolicy};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// 运行模式：debug 使用通用日志/恢复中间件，其余模式使用自定义访问日志与恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Debug,
    Release,
    Test,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(RunMode::Debug),
            "release" => Ok(RunMode::Release),
            "test" => Ok(RunMode::Test),
            other => Err(format!("unknown run mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub run_mode: RunMode,
    pub bind: SocketAddr,
    /// tags.json / articles.json 所在目录
    pub data_dir: PathBuf,
    pub upload_save_path: PathBuf,
    pub upload_server_url: String,
    /// 图片大小上限（MB）
    pub upload_image_max_size: usize,
    pub upload_image_allow_exts: Vec<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// 单个请求的处理时限
    pub context_timeout: Duration,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// token 有效期（秒）
    pub jwt_expire: i64,
    pub credentials: Vec<AppCredential>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Debug,
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_dir: PathBuf::from("./data"),
            upload_save_path: PathBuf::from("storage/uploads"),
            upload_server_url: "http://127.0.0.1:8000/static".into(),
            upload_image_max_size: 5,
            upload_image_allow_exts: vec![".jpg".into(), ".jpeg".into(), ".png".into()],
            default_page_size: 10,
            max_page_size: 100,
            context_timeout: Duration::from_secs(60),
            jwt_secret: String::new(),
            jwt_issuer: "blog-service".into(),
            jwt_expire: 7200,
            credentials: Vec::new(),
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={raw:?} is not valid, falling back to default");
            default
        }),
        Err(_) => default,
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let run_mode = env::var("BLOG_RUN_MODE")
            .ok()
            .map(|s| {
                s.parse().unwrap_or_else(|e: String| {
                    warn!("{e}; using release");
                    RunMode::Release
                })
            })
            .unwrap_or(defaults.run_mode);

        let upload_image_allow_exts = env::var("BLOG_UPLOAD_IMAGE_ALLOW_EXTS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .map(|t| {
                        if t.starts_with('.') {
                            t.to_string()
                        } else {
                            format!(".{t}")
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|exts| !exts.is_empty())
            .unwrap_or(defaults.upload_image_allow_exts);

        // JWT 密钥未配置时随机生成，重启后旧 token 失效
        let jwt_secret = env::var("BLOG_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                info!("BLOG_JWT_SECRET not set; generating a random secret for this run");
                uuid::Uuid::new_v4().to_string()
            });

        let credentials = match (env::var("BLOG_APP_KEY"), env::var("BLOG_APP_SECRET")) {
            (Ok(app_key), Ok(app_secret)) if !app_key.is_empty() && !app_secret.is_empty() => {
                vec![AppCredential { app_key, app_secret }]
            }
            _ => {
                warn!("BLOG_APP_KEY/BLOG_APP_SECRET not configured; GET /auth will reject every request");
                Vec::new()
            }
        };

        Self {
            run_mode,
            bind: parsed("BLOG_BIND", defaults.bind),
            data_dir: env::var("BLOG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            upload_save_path: env::var("BLOG_UPLOAD_SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_save_path),
            upload_server_url: env::var("BLOG_UPLOAD_SERVER_URL")
                .unwrap_or(defaults.upload_server_url),
            upload_image_max_size: parsed("BLOG_UPLOAD_IMAGE_MAX_SIZE", defaults.upload_image_max_size),
            upload_image_allow_exts,
            default_page_size: parsed("BLOG_DEFAULT_PAGE_SIZE", defaults.default_page_size),
            max_page_size: parsed("BLOG_MAX_PAGE_SIZE", defaults.max_page_size),
            context_timeout: Duration::from_secs(parsed("BLOG_CONTEXT_TIMEOUT", 60)),
            jwt_secret,
            jwt_issuer: env::var("BLOG_JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            jwt_expire: parsed("BLOG_JWT_EXPIRE", defaults.jwt_expire),
            credentials,
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            save_path: self.upload_save_path.clone(),
            server_url: self.upload_server_url.clone(),
            image_max_size: self.upload_image_max_size,
            image_allow_exts: self.upload_image_allow_exts.clone(),
        }
    }
}
