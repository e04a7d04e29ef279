//! # Basic Caching Example
//!
//! This example demonstrates the cacheable repository layer:
//! - Wrapping a repository with the caching decorator
//! - Understanding cache hits vs misses
//! - Bypassing the cache per instance and per request
//! - Cache invalidation on writes

use repocache::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Simple product model for caching demonstration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i32,
    pub category: String,
}

fn product(id: i64, name: &str, price: i32, category: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        category: category.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🚀 repocache Basic Caching Example");
    println!("==================================");

    // 1. Cache Setup
    println!("\n🗄️  Setting up the cache");
    println!("------------------------");

    let cache_config = CacheConfig::new("memory", 10).with_allowed(AllowedMethods::except(["paginate"]));
    let repocache = RepoCache::new(AppConfig {
        cache: cache_config,
    })?;
    println!("✅ In-memory cache store ready ({} minute entries)", repocache.config().cache.minutes);

    // 2. Repositories
    println!("\n🏪 Repository Configuration");
    println!("---------------------------");

    let products = MemoryRepository::<Product>::new(
        "products",
        vec![
            product(1, "Laptop", 1299, "electronics"),
            product(2, "Desk", 349, "furniture"),
            product(3, "Monitor", 279, "electronics"),
        ],
    );
    let cached = repocache
        .cached(products.clone())
        .with_request(RequestContext::from_url("https://shop.example.com/products"));
    println!("✅ Products repository wrapped with the caching decorator");

    // 3. Hits vs misses
    println!("\n⚡ Cache Hits vs Misses");
    println!("-----------------------");

    let start = Instant::now();
    let laptop = cached.find(&1, &[]).await?;
    println!("📦 First find: {} ({:?}, miss)", laptop.name, start.elapsed());

    let start = Instant::now();
    let laptop = cached.find(&1, &[]).await?;
    println!("📦 Second find: {} ({:?}, hit)", laptop.name, start.elapsed());

    let electronics: Arc<dyn Criterion> = Arc::new(FilterCriterion::single(QueryFilter::eq(
        "category",
        serde_json::json!("electronics"),
    )));
    let found = cached.get_by_criteria(electronics.clone()).await?;
    println!("🔎 {} electronics products (cached by criterion)", found.len());

    let keys = repocache.registry().keys("products").await?;
    println!("🔑 Keys recorded for products:");
    for key in &keys {
        println!("   {}", key);
    }

    // 4. Bypass
    println!("\n🚫 Bypassing the cache");
    println!("----------------------");

    println!("paginate cacheable: {}", cached.allowed_cache("paginate"));
    let fresh = cached.for_request(RequestContext::from_url(
        "https://shop.example.com/products?skipCache=1",
    ));
    println!("skipCache=1 request skips cache: {}", fresh.is_skipped_cache());
    let page = fresh.paginate(Some(2), 1, &[]).await?;
    println!("📄 Page {}/{} with {} products", page.current_page, page.last_page, page.data.len());

    // 5. Invalidation on writes
    println!("\n🧹 Cache Invalidation");
    println!("---------------------");

    cached
        .update(&1, serde_json::json!({"price": 1199}))
        .await?;
    let laptop = cached.find(&1, &[]).await?;
    println!("💸 Laptop price after update: {}", laptop.price);
    println!(
        "🔑 Keys recorded after update: {}",
        repocache.registry().keys("products").await?.len()
    );

    let flushed = repocache.flush_repository("products").await?;
    println!("🧽 Flushed {} cached results", flushed);

    println!("\n🎉 Done");
    Ok(())
}
