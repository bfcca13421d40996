//! Plain HTML pages for the request surface. No templating engine; every
//! dynamic value goes through [`escape`].

use std::fmt::Write;

use crate::db::{AttendanceRow, Counts, Event, NewParticipant, Participant};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, nav: bool, body: &str) -> String {
    let nav = if nav {
        r#"<nav>
<a href="/dashboard">Dashboard</a> |
<a href="/add_participant">Add participant</a> |
<a href="/view_participants">Participants</a> |
<a href="/mark_attendance">Mark attendance</a> |
<a href="/view_attendance">Attendance</a> |
<a href="/export_attendance">Export</a> |
<a href="/logout">Logout</a>
</nav>"#
    } else {
        ""
    };
    format!(
        "<!DOCTYPE html>\n<html>\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{nav}\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|msg| format!("<p class=\"error\">{}</p>\n", escape(msg)))
        .unwrap_or_default()
}

fn opt(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        r#"{}<form method="post" action="/">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        error_banner(error)
    );
    layout("Login", false, &body)
}

pub fn dashboard_page(username: &str, counts: &Counts) -> String {
    let body = format!(
        "<p>Signed in as {}</p>\n<ul>\n<li>Participants: {}</li>\n<li>Events: {}</li>\n\
         <li>Attendance records: {}</li>\n</ul>",
        escape(username),
        counts.participants,
        counts.events,
        counts.attendance
    );
    layout("Dashboard", true, &body)
}

pub fn add_participant_page(error: Option<&str>, prefill: &NewParticipant) -> String {
    let body = format!(
        r#"{}<form method="post" action="/add_participant">
<label>Name <input name="name" value="{}" required></label>
<label>District <input name="district" value="{}"></label>
<label>Contact <input name="contact" value="{}"></label>
<button type="submit">Add</button>
</form>"#,
        error_banner(error),
        escape(&prefill.name),
        opt(prefill.district.as_deref()),
        opt(prefill.contact.as_deref()),
    );
    layout("Add participant", true, &body)
}

pub fn participants_page(participants: &[Participant], district: Option<&str>) -> String {
    let mut body = format!(
        r#"<form method="get" action="/view_participants">
<label>District <input name="district" value="{}"></label>
<button type="submit">Filter</button>
</form>
<table>
<tr><th>ID</th><th>Name</th><th>District</th><th>Contact</th></tr>
"#,
        opt(district)
    );
    for p in participants {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            p.id,
            escape(&p.name),
            opt(p.district.as_deref()),
            opt(p.contact.as_deref()),
        );
    }
    body.push_str("</table>");
    layout("Participants", true, &body)
}

pub fn mark_attendance_page(
    participants: &[Participant],
    events: &[Event],
    error: Option<&str>,
) -> String {
    let mut participant_opts = String::new();
    for p in participants {
        let label = match p.district.as_deref() {
            Some(d) => format!("{} ({})", p.name, d),
            None => p.name.clone(),
        };
        let _ = writeln!(
            participant_opts,
            "<option value=\"{}\">{}</option>",
            p.id,
            escape(&label)
        );
    }
    let mut event_opts = String::new();
    for e in events {
        let _ = writeln!(
            event_opts,
            "<option value=\"{}\">{} ({}/month)</option>",
            e.id,
            escape(&e.name),
            e.frequency_per_month
        );
    }

    let body = format!(
        r#"{}<form method="post" action="/mark_attendance">
<label>Participant <select name="participant_id" required>
{participant_opts}</select></label>
<label>Event <select name="event_id" required>
{event_opts}</select></label>
<label>Date <input name="date" type="date"></label>
<button type="submit">Mark</button>
</form>"#,
        error_banner(error)
    );
    layout("Mark attendance", true, &body)
}

pub fn attendance_page(rows: &[AttendanceRow]) -> String {
    let mut body = String::from(
        "<p><a href=\"/export_attendance\">Download spreadsheet</a></p>\n<table>\n\
         <tr><th>Name</th><th>District</th><th>Event</th><th>Date</th></tr>\n",
    );
    for r in rows {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&r.participant_name),
            opt(r.district.as_deref()),
            escape(&r.event_name),
            r.date.format("%Y-%m-%d"),
        );
    }
    body.push_str("</table>");
    layout("Attendance", true, &body)
}

pub fn error_page(message: &str) -> String {
    layout("Error", false, &format!("<p>{}</p>\n<p><a href=\"/\">Back</a></p>", escape(message)))
}
