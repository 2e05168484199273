use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 单条限流规则：路径前缀 + 令牌桶参数
#[derive(Debug, Clone)]
pub struct LimitBucketRule {
    pub key: String,
    /// 每隔 fill_interval 放入 quantum 个令牌
    pub fill_interval: Duration,
    pub capacity: u64,
    pub quantum: u64,
}

#[derive(Debug)]
struct TokenBucket {
    fill_interval: Duration,
    capacity: u64,
    quantum: u64,
    available: u64,
    /// 上一次补充令牌的时刻（按 fill_interval 对齐）
    last_tick: Instant,
}

impl TokenBucket {
    fn new(rule: &LimitBucketRule, now: Instant) -> Self {
        Self {
            fill_interval: rule.fill_interval,
            capacity: rule.capacity,
            quantum: rule.quantum,
            available: rule.capacity,
            last_tick: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        if self.fill_interval.is_zero() {
            self.available = self.capacity;
            return;
        }
        let elapsed = now.saturating_duration_since(self.last_tick);
        let ticks = (elapsed.as_nanos() / self.fill_interval.as_nanos()) as u64;
        if ticks == 0 {
            return;
        }
        self.available = self
            .available
            .saturating_add(ticks.saturating_mul(self.quantum))
            .min(self.capacity);
        self.last_tick += self.fill_interval * ticks.min(u32::MAX as u64) as u32;
    }

    /// 取一个令牌，桶空返回 false
    fn take_at(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }
}

/// 按路由前缀划分的令牌桶限流器（基于内存）。
#[derive(Debug, Default)]
pub struct MethodLimiter {
    /// 规则按 key 长度降序，优先匹配最长前缀
    rules: Vec<LimitBucketRule>,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl MethodLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_buckets(mut self, rules: impl IntoIterator<Item = LimitBucketRule>) -> Self {
        for rule in rules {
            tracing::debug!(key = %rule.key, capacity = rule.capacity, quantum = rule.quantum, "rate limit rule added");
            self.rules.retain(|r| r.key != rule.key);
            self.rules.push(rule);
        }
        self.rules.sort_by(|a, b| b.key.len().cmp(&a.key.len()));
        self
    }

    /// 返回命中的规则 key；按路径段匹配，`/auth` 命中 `/auth` 与 `/auth/x`，不命中 `/authors`
    pub fn key(&self, path: &str) -> Option<&str> {
        let path = path.split('?').next().unwrap_or(path);
        self.rules
            .iter()
            .find(|rule| {
                let key = rule.key.trim_end_matches('/');
                match path.strip_prefix(key) {
                    Some(rest) => rest.is_empty() || rest.starts_with('/') || key.is_empty(),
                    None => false,
                }
            })
            .map(|rule| rule.key.as_str())
    }

    /// 返回是否允许当前请求；没有对应规则的 key 一律放行。
    pub async fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now()).await
    }

    async fn allow_at(&self, key: &str, now: Instant) -> bool {
        let Some(rule) = self.rules.iter().find(|r| r.key == key) else {
            return true;
        };
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(rule.key.clone())
            .or_insert_with(|| TokenBucket::new(rule, now))
            .take_at(now)
    }
}
