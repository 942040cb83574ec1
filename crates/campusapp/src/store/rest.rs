use super::Repository;
use crate::client::{ApiClient, Envelope, Payload, Verb};
use crate::error::{CampusError, Result};
use crate::model::{EmailCampaign, Event, GalleryItem, GuidanceSession, NewsItem, Record};
use std::marker::PhantomData;

/// How a collection addresses a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStyle {
    /// `/api/gallery/:id`
    Path,
    /// `/api/emails?id=:id`
    Query,
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub collection: &'static str,
    pub id_style: IdStyle,
    /// Payload keys searched, in order, for the list on `GET`.
    pub list_keys: &'static [&'static str],
    /// Payload keys searched, in order, for the echoed record on create/update.
    pub item_keys: &'static [&'static str],
}

/// A record served by the site's REST API.
pub trait RemoteRecord: Record {
    const ENDPOINT: Endpoint;
}

impl RemoteRecord for EmailCampaign {
    const ENDPOINT: Endpoint = Endpoint {
        collection: "/api/emails",
        id_style: IdStyle::Query,
        list_keys: &["emails", "campaigns", "data"],
        item_keys: &["email", "campaign", "data"],
    };
}

impl RemoteRecord for GalleryItem {
    const ENDPOINT: Endpoint = Endpoint {
        collection: "/api/gallery",
        id_style: IdStyle::Path,
        list_keys: &["galleries", "gallery", "items", "data"],
        item_keys: &["gallery", "item", "data"],
    };
}

impl RemoteRecord for GuidanceSession {
    const ENDPOINT: Endpoint = Endpoint {
        collection: "/api/guidance",
        id_style: IdStyle::Path,
        list_keys: &["guidance", "sessions", "data"],
        item_keys: &["guidance", "session", "data"],
    };
}

impl RemoteRecord for Event {
    const ENDPOINT: Endpoint = Endpoint {
        collection: "/api/events",
        id_style: IdStyle::Path,
        list_keys: &["events", "data"],
        item_keys: &["event", "data"],
    };
}

impl RemoteRecord for NewsItem {
    const ENDPOINT: Endpoint = Endpoint {
        collection: "/api/news",
        id_style: IdStyle::Path,
        list_keys: &["news", "data"],
        item_keys: &["news", "item", "data"],
    };
}

pub struct RestRepository<T> {
    client: ApiClient,
    _record: PhantomData<T>,
}

impl<T: RemoteRecord> RestRepository<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    fn send_to(&self, verb: Verb, id: &str, payload: Option<Payload>) -> Result<Envelope> {
        if id.is_empty() {
            return Err(CampusError::Validation(format!("{} id is empty", T::NOUN)));
        }
        let endpoint = T::ENDPOINT;
        match endpoint.id_style {
            IdStyle::Path => {
                let path = format!("{}/{}", endpoint.collection, id);
                self.client.perform(verb, &path, &[], payload)
            }
            IdStyle::Query => {
                self.client
                    .perform(verb, endpoint.collection, &[("id", id)], payload)
            }
        }
    }
}

impl<T: RemoteRecord> Repository<T> for RestRepository<T> {
    fn list(&self) -> Result<Vec<T>> {
        let envelope = self.client.get(T::ENDPOINT.collection)?;
        envelope.list(T::ENDPOINT.list_keys)
    }

    fn create(&self, payload: Payload) -> Result<Option<T>> {
        let envelope =
            self.client
                .perform(Verb::Post, T::ENDPOINT.collection, &[], Some(payload))?;
        envelope.item(T::ENDPOINT.item_keys)
    }

    fn update(&self, id: &str, payload: Payload) -> Result<Option<T>> {
        let envelope = self.send_to(Verb::Put, id, Some(payload))?;
        envelope.item(T::ENDPOINT.item_keys)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.send_to(Verb::Delete, id, None).map(|_| ())
    }

    fn describe(&self) -> String {
        self.client
            .url(T::ENDPOINT.collection, &[])
            .map(|url| url.to_string())
            .unwrap_or_else(|_| T::ENDPOINT.collection.to_string())
    }
}
