//! HTML fixtures shaped like the live site, shared by unit tests.

/// A rendered listing with one entry per href.
pub fn listing_html(hrefs: &[&str]) -> String {
    let entries: String = hrefs
        .iter()
        .map(|h| {
            format!(
                r#"<li class="posts-listing__item"><article class="post-card"><header><a href="{h}">teaser</a></header></article></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><main><ul class="posts-listing__list">{entries}</ul><button class="btn posts-listing__more-btn">Load more</button></main></body></html>"#
    )
}

/// A stats item as rendered in the article's action bar.
pub fn stat_item(label: &str, count: &str) -> String {
    format!(
        r#"<div class="post-actions__item post-actions__item_stat"><span class="post-actions__item-title">{label}</span><span class="post-actions__item-count">{count}</span></div>"#
    )
}

/// An article page with every field present.
pub fn article_html(title: &str, date: &str, stats: &[String], tags: &[&str]) -> String {
    let stats: String = stats.concat();
    let tags: String = tags
        .iter()
        .map(|t| format!(r##"<li class="tags-list__item"><a href="#">{t}</a></li>"##))
        .collect();
    format!(
        r#"<html><body><main><div class="container"><div class="post post-page__article"><article class="post__article">
<h1 class="post__title"> {title} </h1>
<div class="post-meta"><div class="post-meta__author-name"> Jane Doe </div>
<div class="post-meta__publish-date"><time datetime="{date}"> 2 hours ago </time></div></div>
<div class="post-actions post__block post__block_post-actions">{stats}</div>
<div class="tags-list"><ul class="tags-list__list">{tags}</ul></div>
</article></div></div></main></body></html>"#
    )
}

/// An article page with just the given date and default everything else.
pub fn dated_article_html(date: &str) -> String {
    article_html(
        "Headline",
        date,
        &[stat_item("Total views", "100"), stat_item("Total shares", "7")],
        &["Bitcoin"],
    )
}
