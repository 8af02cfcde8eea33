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

use std::time::Duration;

use switchboard::common::{init_tracing, CONFIG};
use switchboard::prelude::*;

#[switchboard_message]
struct Quote {
    symbol: &'static str,
    bid: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logs go to the file configured under [tracing] (logs/switchboard.log by default)
    let _guard = init_tracing(&CONFIG.tracing);

    // the downstream only needs an endpoint; a bare processor will do
    let mut printer = MessageProcessor::<()>::new("quote-printer");
    printer.register_handler::<Quote, _>(|_, quote| {
        println!("{} {:.2}", quote.symbol, quote.bid);
        Reply::ok()
    })?;
    let printer = printer.start(());

    // no more than 3 quotes per 250ms reach the printer
    let throttler = Throttler::<Quote>::start(
        Address::new("quote-throttle")?,
        printer.endpoint().clone(),
        ThrottlerConfig::new(Duration::from_millis(250), 3)?,
        Componentry::default(),
    )
    .await?;

    for n in 0..10 {
        throttler.send(Quote {
            symbol: "MSFT",
            bid: 410.0 + f64::from(n) / 100.0,
        });
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    let stats = throttler.stats();
    println!(
        "received {}, forwarded {}, still buffered {}",
        stats.total_count(),
        stats.forwarded_count(),
        stats.buffered()
    );

    // whatever the throttler had not forwarded yet comes back from `stop`
    if let Some(unsent) = throttler.stop(Duration::from_secs(1)).await {
        println!("{} quotes were never sent", unsent.len());
    }
    printer.graceful_stop().await;
    Ok(())
}
