use moderation_webhook::{ContentCategory, Rejection, ReviewItem, WebhookClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moderation_webhook=debug")),
        )
        .init();

    let client = WebhookClient::from_env().map_err(anyhow::Error::msg)?;

    let story = ReviewItem::new("News", 14).with_title("Cold exposure and sleep");
    let approved = client.approve(ContentCategory::News, &story).await?;
    println!("approve: {}", approved.data);

    let post = ReviewItem::new("text/image", 9).with_caption("Sauna protocol");
    let rejection = Rejection::default()
        .with_feedback("needs sources")
        .with_image_query("wooden sauna interior");
    let rejected = client
        .reject(ContentCategory::from_label("content"), &post, &rejection)
        .await?;
    println!("reject: {}", rejected.data);

    Ok(())
}
