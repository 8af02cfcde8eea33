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

use switchboard::prelude::*;

// component models implement `Component`; the default hooks just log a warning
#[derive(Debug, Default)]
struct Pinger {
    exchanges: usize,
}

#[async_trait]
impl Component for Pinger {
    async fn on_stop(&mut self, ctx: &ComponentContext, _command: &Stop) -> anyhow::Result<()> {
        println!("{} stopping after {} exchanges", ctx.name(), self.exchanges);
        Ok(())
    }
}

// messages are any `Clone + Debug + Send + Sync + 'static` type, the macro derives the rest
#[switchboard_message]
struct Ping;

#[switchboard_message]
struct Pong;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut pinger = ManagedComponent::new(
        Address::new("pinger")?,
        Componentry::default(),
        Pinger::default(),
    );

    pinger
        .mutate_on::<Ping, _>(|agent, _ping| {
            println!("Pinged. You can mutate me!");
            agent.model.exchanges += 1;
            // the component can send to itself; the message queues behind everything already accepted
            agent.ctx().send_to_self(Pong);
            Reply::ok()
        })?
        .mutate_on::<Pong, _>(|agent, _pong| {
            agent.model.exchanges += 1;
            // handlers with async work return a pending reply
            Reply::pending(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                println!("I got ponged!");
                Ok(())
            })
        })?;

    // `start` returns once the component is Running
    let pinger = pinger.start().await?;
    pinger.mailbox().send(Ping);

    // Stop queues behind Ping and Pong, so both are handled first
    let stopped = pinger.stop(Duration::from_secs(1)).await;
    println!(
        "stopped cleanly: {stopped}, messages processed: {}",
        pinger.stats().processed_count()
    );
    Ok(())
}
