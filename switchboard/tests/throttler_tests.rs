/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Throttler timing tests.
//!
//! These run on a paused Tokio clock (`start_paused = true`), so interval boundaries
//! are exact and the tests take no wall time.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use switchboard::prelude::*;
use tokio::time::Instant;

use crate::setup::initialize_tracing;
use crate::setup::messages::NewOrder;

mod setup;

type Deliveries<T> = Arc<Mutex<Vec<(T, Instant)>>>;

/// A downstream processor that records what arrives and when.
fn downstream<T: Message>() -> anyhow::Result<(ProcessorHandle, Deliveries<T>)> {
    let deliveries: Deliveries<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deliveries);
    let mut processor = MessageProcessor::<()>::new("downstream");
    processor.register_handler::<T, _>(move |_, message| {
        sink.lock().push((message, Instant::now()));
        Reply::ok()
    })?;
    Ok((processor.start(()), deliveries))
}

fn values<T: Clone>(deliveries: &Deliveries<T>) -> Vec<T> {
    deliveries.lock().iter().map(|(value, _)| value.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_limit_two_per_second_releases_five_by_two_seconds() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, deliveries) = downstream::<u32>()?;
    let throttler = Throttler::<u32>::start(
        Address::new("order-throttle")?,
        sink.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_secs(1), 2)?,
        Componentry::default(),
    )
    .await?;

    let t0 = Instant::now();
    for n in 1..=5_u32 {
        throttler.send(n);
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(values(&deliveries), vec![1, 2]);
    assert_eq!(throttler.stats().buffered(), 3);
    assert!(throttler.stats().is_active());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(values(&deliveries), vec![1, 2, 3, 4]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(values(&deliveries), vec![1, 2, 3, 4, 5]);
    let last_delivery = deliveries.lock().last().map(|(_, at)| *at);
    assert!(last_delivery.is_some_and(|at| at <= t0 + Duration::from_secs(2)));

    let stats = throttler.stats();
    assert_eq!(stats.total_count(), 5);
    assert_eq!(stats.forwarded_count(), 5);
    assert_eq!(stats.buffered(), 0);

    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    assert!(sink.graceful_stop().await);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_never_exceeds_limit_per_interval() -> anyhow::Result<()> {
    initialize_tracing();
    let interval = Duration::from_millis(100);
    let (sink, deliveries) = downstream::<u32>()?;
    let throttler = Throttler::<u32>::start(
        Address::new("quote-throttle")?,
        sink.endpoint().clone(),
        ThrottlerConfig::new(interval, 3)?,
        Componentry::default(),
    )
    .await?;

    let t0 = Instant::now();
    // Bursts arriving mid-interval.
    for burst in 0..4_u32 {
        for n in 0..6 {
            throttler.send(burst * 6 + n);
        }
        tokio::time::sleep(Duration::from_millis(130)).await;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(values(&deliveries), (0..24).collect::<Vec<_>>());
    let mut per_interval: BTreeMap<u128, usize> = BTreeMap::new();
    for (_, at) in deliveries.lock().iter() {
        let bucket = at.duration_since(t0).as_millis() / interval.as_millis();
        *per_interval.entry(bucket).or_default() += 1;
    }
    assert!(per_interval.values().all(|&count| count <= 3), "{per_interval:?}");

    let stats = throttler.stats();
    assert_eq!(stats.total_count(), 24);
    assert_eq!(stats.forwarded_count(), 24);
    assert!(!stats.is_active(), "throttler goes idle once its buffer is empty");

    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_bounded_buffer_rejects_overflow() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, deliveries) = downstream::<u32>()?;
    let config = ThrottlerConfig::new(Duration::from_secs(1), 1)?
        .with_buffer_capacity(NonZeroUsize::new(2).ok_or_else(|| anyhow::anyhow!("zero"))?);
    let throttler = Throttler::<u32>::start(
        Address::new("bounded-throttle")?,
        sink.endpoint().clone(),
        config,
        Componentry::default(),
    )
    .await?;

    for n in 0..5_u32 {
        throttler.send(n);
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    let stats = throttler.stats();
    assert_eq!(stats.total_count(), 5);
    assert_eq!(stats.forwarded_count(), 1);
    assert_eq!(stats.buffered(), 2);
    assert_eq!(stats.rejected_count(), 2);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(values(&deliveries), vec![0, 1, 2]);
    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_envelopes_are_throttled_like_bare_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, deliveries) = downstream::<NewOrder>()?;
    let throttler = Throttler::<NewOrder>::start(
        Address::new("exchange-throttle")?,
        sink.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_secs(1), 1)?,
        Componentry::default(),
    )
    .await?;

    let first = NewOrder::new("AAPL", 1);
    let second = NewOrder::new("AAPL", 2);
    throttler.send(first.clone());
    throttler.mailbox().send(Envelope::new(
        second.clone(),
        Some(throttler.mailbox().address().clone()),
        None,
        Utc::now(),
    )?);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(values(&deliveries), vec![first.clone()]);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(values(&deliveries), vec![first, second]);
    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_hands_back_buffered_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, deliveries) = downstream::<u32>()?;
    let throttler = Throttler::<u32>::start(
        Address::new("stopping-throttle")?,
        sink.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_secs(60), 2)?,
        Componentry::default(),
    )
    .await?;

    for n in 0..6_u32 {
        throttler.send(n);
    }
    let unsent = throttler.stop(Duration::from_secs(5)).await;
    assert_eq!(unsent, Some(vec![2, 3, 4, 5]));
    assert_eq!(throttler.handle().state(), ComponentState::Stopped);
    assert!(!throttler.stats().is_active());
    assert_eq!(throttler.stats().buffered(), 0);

    assert!(sink.graceful_stop().await);
    assert_eq!(values(&deliveries), vec![0, 1]);
    assert_eq!(throttler.stats().forwarded_count(), 2);
    Ok(())
}

/// A downstream with room for one message and a slow handler pushes back on the
/// throttler; everything still arrives, in order.
#[tokio::test(start_paused = true)]
async fn test_full_downstream_delays_instead_of_dropping() -> anyhow::Result<()> {
    initialize_tracing();
    let deliveries: Deliveries<u32> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deliveries);
    let mut slow = MessageProcessor::<()>::with_capacity("slow-gateway", 1)?;
    slow.register_handler::<u32, _>(move |_, n| {
        let sink = Arc::clone(&sink);
        Reply::pending(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            sink.lock().push((n, Instant::now()));
            Ok(())
        })
    })?;
    let slow = slow.start(());

    let throttler = Throttler::<u32>::start(
        Address::new("gateway-throttle")?,
        slow.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_secs(1), 5)?,
        Componentry::default(),
    )
    .await?;

    for n in 0..10_u32 {
        throttler.send(n);
    }
    tokio::time::sleep(Duration::from_millis(500)).await;
    let stats = throttler.stats();
    assert!(stats.forwarded_count() < 10);
    assert_eq!(
        stats.forwarded_count() + stats.buffered() as u64,
        stats.total_count()
    );

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(values(&deliveries), (0..10).collect::<Vec<_>>());
    assert_eq!(stats.total_count(), 10);
    assert_eq!(stats.forwarded_count(), 10);
    assert_eq!(stats.dropped_count(), 0);
    assert_eq!(stats.buffered(), 0);

    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    assert!(slow.graceful_stop().await);
    Ok(())
}

/// A closed downstream is the one case where messages are lost; they are counted.
#[tokio::test(start_paused = true)]
async fn test_closed_downstream_drops_and_counts() -> anyhow::Result<()> {
    initialize_tracing();
    let (sink, deliveries) = downstream::<u32>()?;
    let throttler = Throttler::<u32>::start(
        Address::new("orphan-throttle")?,
        sink.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_secs(1), 10)?,
        Componentry::default(),
    )
    .await?;
    assert!(sink.graceful_stop().await);

    for n in 0..3_u32 {
        throttler.send(n);
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    let stats = throttler.stats();
    assert_eq!(stats.total_count(), 3);
    assert_eq!(stats.forwarded_count(), 0);
    assert_eq!(stats.dropped_count(), 3);
    assert!(values(&deliveries).is_empty());
    assert_eq!(throttler.stop(Duration::from_secs(5)).await, Some(Vec::new()));
    Ok(())
}
