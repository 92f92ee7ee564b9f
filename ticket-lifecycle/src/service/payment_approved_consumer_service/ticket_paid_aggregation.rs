use crate::{domain::Ticket, dto::output};
use uuid::Uuid;

struct EventGroup {
    event_id: Uuid,
    amount: i64,
    seat_ids: Vec<Uuid>,
}

///
/// Builds Ticket-Paid events for paid tickets of one order.
///
/// Tickets are grouped by event in first-seen order and only groups
/// holding at least one seat produce an event. Seat ids are distinct.
/// When the whole order belongs to a single event the event carries
/// `total_amount` of the payment, otherwise each event carries
/// the sum of its tickets' amounts.
///
pub fn ticket_paid_events(
    order_id: Uuid,
    total_amount: i64,
    paid_tickets: &[Ticket],
) -> Vec<output::TicketPaid> {
    // linear lookup keeps first-seen order, orders hold a handful of tickets
    let mut groups: Vec<EventGroup> = Vec::new();
    for ticket in paid_tickets {
        let index = match groups
            .iter()
            .position(|group| group.event_id == ticket.event_id())
        {
            Some(index) => index,
            None => {
                groups.push(EventGroup {
                    event_id: ticket.event_id(),
                    amount: 0,
                    seat_ids: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        group.amount += ticket.amount();
        if let Some(seat_id) = ticket.seat_id() {
            if !group.seat_ids.contains(&seat_id) {
                group.seat_ids.push(seat_id);
            }
        }
    }

    let single_event = groups.len() == 1;
    if groups.len() > 1 {
        tracing::warn!(
            %order_id,
            events = groups.len(),
            "order spans multiple events"
        );
    }

    groups
        .into_iter()
        .filter(|group| !group.seat_ids.is_empty())
        .map(|group| output::TicketPaid {
            order_id,
            event_id: group.event_id,
            total_amount: match single_event {
                true => total_amount,
                false => group.amount,
            },
            seat_ids: group.seat_ids,
        })
        .collect()
}
