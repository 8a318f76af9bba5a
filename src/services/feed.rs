use crate::{
    config::feed::{FeedConfig, FEED_REALM},
    models::UserModel,
    services::notice::NoticeWithType,
};
use atom_syndication::{Content, Entry, Feed, FixedDateTime, Link, Person};
use chrono::NaiveDateTime;

pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";

fn as_fixed(timestamp: NaiveDateTime) -> FixedDateTime {
    timestamp.and_utc().fixed_offset()
}

/// Render a user's notices as an Atom feed.
///
/// `items` are expected newest first; the feed's `updated` is the newest
/// notice's timestamp, or `now` for an empty feed.
pub fn build_user_feed(
    config: &FeedConfig,
    user: &UserModel,
    items: &[NoticeWithType],
    now: NaiveDateTime,
) -> Feed {
    let feed_url = format!("{}/feed/{}", config.base_url, user.username);
    let updated = items
        .iter()
        .map(|(notice, _)| notice.added)
        .max()
        .unwrap_or(now);

    let mut author = Person::default();
    author.set_name(user.username.clone());

    let mut self_link = Link::default();
    self_link.set_href(feed_url.clone());
    self_link.set_rel("self");

    let entries: Vec<Entry> = items
        .iter()
        .map(|(notice, notice_type)| {
            let title = notice_type
                .as_ref()
                .map(|t| t.display.clone())
                .unwrap_or_else(|| "Notice".to_string());
            let entry_url = format!("{}/api/v1/notices/{}", config.base_url, notice.id);

            let mut content = Content::default();
            content.set_value(notice.message.clone());
            content.set_content_type("text".to_string());

            let mut link = Link::default();
            link.set_href(entry_url.clone());
            link.set_rel("alternate");

            let mut entry = Entry::default();
            entry.set_id(entry_url);
            entry.set_title(title);
            entry.set_updated(as_fixed(notice.added));
            entry.set_published(as_fixed(notice.added));
            entry.set_content(content);
            entry.set_links(vec![link]);
            entry
        })
        .collect();

    let mut feed = Feed::default();
    feed.set_id(feed_url);
    feed.set_title(format!("{FEED_REALM} for {}", user.username));
    feed.set_updated(as_fixed(updated));
    feed.set_authors(vec![author]);
    feed.set_links(vec![self_link]);
    feed.set_entries(entries);
    feed
}
