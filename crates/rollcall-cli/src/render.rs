//! Plain-text rendering.
//!
//! Every function writes to any [`Write`], so tests render into a `Vec<u8>`.

use std::io::{self, Write};

use rollcall_core::{
    AttendanceEngine, AttendanceState, AttendanceUpdate, DeliveryPolicy, Event, Session,
};

/// One line per event, in server order.
pub fn events<P: DeliveryPolicy>(out: &mut impl Write, engine: &AttendanceEngine<P>) -> io::Result<()> {
    let mut listed = 0;
    for (event, state) in engine.events() {
        writeln!(
            out,
            "{:>4}  {}  {:<5}  {:>3} attending{}  {}{}",
            event.id.as_str(),
            event.date,
            event.time,
            state.attendee_count,
            if state.viewer_has_joined { " (joined)" } else { "" },
            event.title,
            members_tag(event),
        )?;
        listed += 1;
    }

    if listed == 0 {
        writeln!(out, "no events")?;
    }
    Ok(())
}

/// Full detail of one event.
pub fn detail(out: &mut impl Write, event: &Event, state: AttendanceState) -> io::Result<()> {
    writeln!(out, "{}{}", event.title, members_tag(event))?;
    writeln!(out, "  when:     {} {}", event.date, event.time)?;
    writeln!(out, "  where:    {}", event.location)?;
    writeln!(out, "  category: {}", event.category)?;
    writeln!(out, "  host:     {}", event.creator_name)?;
    if let Some(url) = &event.image_url {
        writeln!(out, "  image:    {url}")?;
    }
    writeln!(out, "  {}", attendance(state))?;
    if !event.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", event.description)?;
    }
    Ok(())
}

/// Attendee names, one per line.
pub fn attendees(out: &mut impl Write, names: &[String]) -> io::Result<()> {
    if names.is_empty() {
        return writeln!(out, "no attendees yet");
    }
    for name in names {
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

/// Who the service thinks the viewer is.
pub fn session(out: &mut impl Write, session: &Session) -> io::Result<()> {
    if !session.is_authenticated() {
        writeln!(out, "not signed in")
    } else if session.is_guest() {
        writeln!(out, "signed in as guest")
    } else {
        writeln!(out, "signed in as {}", session.name())
    }
}

/// One live update, with the state it left behind.
pub fn update<P: DeliveryPolicy>(
    out: &mut impl Write,
    update: &AttendanceUpdate,
    engine: &AttendanceEngine<P>,
) -> io::Result<()> {
    let title = engine.event(&update.event_id).map_or("(unlisted)", |e| e.title.as_str());
    let state = engine.get(&update.event_id).unwrap_or_default();
    writeln!(out, "{:>4}  {}  {}", update.event_id.as_str(), attendance(state), title)
}

fn attendance(state: AttendanceState) -> String {
    let joined = if state.viewer_has_joined { ", you have joined" } else { "" };
    match state.attendee_count {
        1 => format!("1 person attending{joined}"),
        n => format!("{n} people attending{joined}"),
    }
}

fn members_tag(event: &Event) -> &'static str {
    if event.is_for_logged_in_only { " [members]" } else { "" }
}
