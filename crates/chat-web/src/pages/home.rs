//! Home Page

use leptos::prelude::*;

use chat_core::detector::AssetId;

#[component]
pub fn HomePage() -> impl IntoView {
    let supported = AssetId::ALL
        .into_iter()
        .map(|asset| view! { <li>{format!("{} ({})", asset.display_name(), asset.ticker())}</li> })
        .collect_view();

    view! {
        <div class="home">
            <header class="hero">
                <h1>"crypto-chat"</h1>
                <p class="tagline">"Ask about cryptocurrencies and get answers with live price charts"</p>
                <div class="cta">
                    <a href="/chat" class="btn btn-primary">"Start Chatting"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"📈 Charts"</h3>
                    <p>"Mention a coin and the reply comes with its price history."</p>
                </div>
                <div class="feature">
                    <h3>"💾 History"</h3>
                    <p>"Your conversation stays in this browser between visits."</p>
                </div>
                <div class="feature">
                    <h3>"🪙 Coins"</h3>
                    <ul>{supported}</ul>
                </div>
            </section>
        </div>
    }
}
