use super::{entity::TicketEntity, Error, TicketsRepository};
use crate::domain::{Ticket, TicketSnapshot, TicketState};
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{options::IndexOptions, Collection, Database, IndexModel};
use uuid::Uuid;

const TICKETS: &str = "tickets";
const INDEX_NAME_ORDER_ID: &str = "index_order_id";
const INDEX_NAME_SEAT_ID_STATE: &str = "index_seat_id_state";

pub struct TicketsRepositoryImpl {
    database: Database,
}

impl TicketsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        let collection_names = database.list_collection_names().await?;
        if !collection_names.iter().any(|name| name == TICKETS) {
            tracing::debug!(collection = TICKETS, "creating collection");
            database.create_collection(TICKETS).await?;
        }

        let collection = database.collection::<Document>(TICKETS);

        tracing::debug!("fetching index names");
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_ORDER_ID.to_string()) {
            Self::create_index(&collection, INDEX_NAME_ORDER_ID, doc! { "order_id": 1 }).await?;
        }
        if !index_names.contains(&INDEX_NAME_SEAT_ID_STATE.to_string()) {
            Self::create_index(
                &collection,
                INDEX_NAME_SEAT_ID_STATE,
                doc! { "seat_id": 1, "state": 1 },
            )
            .await?;
        }

        Ok(Self { database })
    }

    async fn create_index(
        collection: &Collection<Document>,
        name: &'static str,
        keys: Document,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build();

        collection.create_index(index).await?;
        tracing::debug!(collection = TICKETS, index = name, "created index");

        Ok(())
    }

    fn collection(&self) -> Collection<TicketEntity> {
        self.database.collection::<TicketEntity>(TICKETS)
    }

    fn into_ticket(entity: TicketEntity) -> Result<Ticket, Error> {
        TicketSnapshot::try_from(entity).map(Ticket::from)
    }
}

#[async_trait]
impl TicketsRepository for TicketsRepositoryImpl {
    async fn find(&self, id: Uuid) -> Result<Option<Ticket>, Error> {
        self.collection()
            .find_one(doc! {
                "_id": bson::Uuid::from(id),
            })
            .await?
            .map(Self::into_ticket)
            .transpose()
    }

    async fn find_many_by_order(&self, order_id: Uuid) -> Result<Vec<Ticket>, Error> {
        let entities: Vec<TicketEntity> = self
            .collection()
            .find(doc! {
                "order_id": bson::Uuid::from(order_id),
            })
            .sort(doc! { "purchase_date": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;

        entities.into_iter().map(Self::into_ticket).collect()
    }

    async fn find_active_by_seat(&self, seat_id: Uuid) -> Result<Option<Ticket>, Error> {
        let cancelled: &'static str = TicketState::Cancelled.into();

        self.collection()
            .find_one(doc! {
                "seat_id": bson::Uuid::from(seat_id),
                "state": { "$ne": cancelled },
            })
            .sort(doc! { "purchase_date": -1 })
            .await?
            .map(Self::into_ticket)
            .transpose()
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), Error> {
        let state: &'static str = ticket.state().into();

        let update_result = self
            .collection()
            .update_one(
                doc! {
                    "_id": bson::Uuid::from(ticket.id()),
                    "version": ticket.version(),
                },
                doc! {
                    "$set": {
                        "state": state,
                        "ticket_code": ticket.ticket_code().as_str(),
                    },
                    "$inc": {
                        "version": 1_i64,
                    },
                },
            )
            .await?;

        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::VersionConflict),
        }
    }

    async fn save_many(&self, tickets: &[Ticket]) -> Result<(), Error> {
        for ticket in tickets {
            self.save(ticket).await?;
        }

        Ok(())
    }
}
