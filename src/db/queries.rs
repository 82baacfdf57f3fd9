use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    Booking, CleaningReport, CleaningStatus, ExternalStatus, PaymentStatus, ReportStatus, Review,
    ServiceType,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, client_id, client_name, email, phone, address, service_type, \
     service_date, preferred_time, payment_status, assigned_cleaner_ids, cleaning_status, \
     report_status, status_override, services, total_price_cents, cleaner_earning_cents, \
     cleaner_percentage, arrived_at, created_at, updated_at";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(s, TS_FORMAT)?)
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                     ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
        ),
        params![
            booking.id,
            booking.client_id,
            booking.client_name,
            booking.email,
            booking.phone,
            booking.address,
            booking.service_type.as_str(),
            booking.service_date,
            booking.preferred_time,
            booking.payment_status.as_str(),
            serde_json::to_string(&booking.assigned_cleaner_ids)?,
            booking.cleaning_status.as_str(),
            booking.report_status.as_str(),
            booking.status_override.map(|s| s.as_str()),
            serde_json::to_string(&booking.services)?,
            booking.total_price_cents,
            booking.cleaner_earning_cents,
            booking.cleaner_percentage,
            booking.arrived_at.as_ref().map(fmt_ts),
            fmt_ts(&booking.created_at),
            fmt_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?
        .transpose()?;

    match booking {
        Some(mut b) => {
            b.report = get_report(conn, &b.id)?;
            Ok(Some(b))
        }
        None => Ok(None),
    }
}

pub fn get_bookings_for_client(conn: &Connection, client_id: &str) -> anyhow::Result<Vec<Booking>> {
    query_bookings(
        conn,
        &format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE client_id = ?1
             ORDER BY service_date DESC, created_at DESC"
        ),
        params![client_id],
    )
}

pub fn get_bookings_for_cleaner(
    conn: &Connection,
    cleaner_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    query_bookings(
        conn,
        &format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE EXISTS (SELECT 1 FROM json_each(bookings.assigned_cleaner_ids) WHERE value = ?1)
             ORDER BY service_date ASC, created_at ASC"
        ),
        params![cleaner_id],
    )
}

pub fn get_all_bookings(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Booking>> {
    query_bookings(
        conn,
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC LIMIT ?1"),
        params![limit],
    )
}

fn query_bookings(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        let mut booking = row??;
        booking.report = get_report(conn, &booking.id)?;
        bookings.push(booking);
    }
    Ok(bookings)
}

pub fn update_payment_status(
    conn: &Connection,
    id: &str,
    status: PaymentStatus,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET payment_status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), fmt_ts(now), id],
    )?;
    Ok(count > 0)
}

pub fn update_assigned_cleaners(
    conn: &Connection,
    id: &str,
    cleaner_ids: &[String],
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET assigned_cleaner_ids = ?1, updated_at = ?2 WHERE id = ?3",
        params![serde_json::to_string(cleaner_ids)?, fmt_ts(now), id],
    )?;
    Ok(count > 0)
}

/// Persists the cleaner-driven progress fields of `booking`.
pub fn update_progress(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings
         SET cleaning_status = ?1, report_status = ?2, arrived_at = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            booking.cleaning_status.as_str(),
            booking.report_status.as_str(),
            booking.arrived_at.as_ref().map(fmt_ts),
            fmt_ts(&booking.updated_at),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &Row<'_>) -> anyhow::Result<Booking> {
    let service_type: String = row.get(6)?;
    let payment_status: String = row.get(9)?;
    let cleaners_json: String = row.get(10)?;
    let cleaning_status: String = row.get(11)?;
    let report_status: String = row.get(12)?;
    let status_override: Option<String> = row.get(13)?;
    let services_json: String = row.get(14)?;
    let arrived_at: Option<String> = row.get(18)?;
    let created_at: String = row.get(19)?;
    let updated_at: String = row.get(20)?;

    Ok(Booking {
        id: row.get(0)?,
        client_id: row.get(1)?,
        client_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        service_type: ServiceType::parse(&service_type),
        service_date: row.get(7)?,
        preferred_time: row.get(8)?,
        payment_status: PaymentStatus::parse(&payment_status),
        assigned_cleaner_ids: serde_json::from_str(&cleaners_json)?,
        cleaning_status: CleaningStatus::parse(&cleaning_status),
        report_status: ReportStatus::parse(&report_status),
        status_override: status_override.as_deref().and_then(ExternalStatus::parse),
        services: serde_json::from_str(&services_json)?,
        total_price_cents: row.get(15)?,
        cleaner_earning_cents: row.get(16)?,
        cleaner_percentage: row.get(17)?,
        arrived_at: arrived_at.as_deref().map(parse_ts).transpose()?,
        report: None,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

// ── Cleaning reports ──

/// Fails with a constraint violation if the booking already has a report.
pub fn insert_report(conn: &Connection, report: &CleaningReport) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO cleaning_reports (booking_id, cleaner_id, arrival_time, start_time,
             end_time, notes, before_photos, after_photos, status, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            report.booking_id,
            report.cleaner_id,
            report.arrival_time,
            report.start_time,
            report.end_time,
            report.notes,
            serde_json::to_string(&report.before_photos)?,
            serde_json::to_string(&report.after_photos)?,
            report.status.as_str(),
            fmt_ts(&report.submitted_at),
        ],
    )?;
    Ok(())
}

pub fn get_report(conn: &Connection, booking_id: &str) -> anyhow::Result<Option<CleaningReport>> {
    let report = conn
        .query_row(
            "SELECT booking_id, cleaner_id, arrival_time, start_time, end_time, notes,
                    before_photos, after_photos, status, submitted_at
             FROM cleaning_reports WHERE booking_id = ?1",
            params![booking_id],
            |row| Ok(parse_report_row(row)),
        )
        .optional()?
        .transpose()?;
    Ok(report)
}

pub fn update_report_status(
    conn: &Connection,
    booking_id: &str,
    status: ReportStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE cleaning_reports SET status = ?1 WHERE booking_id = ?2",
        params![status.as_str(), booking_id],
    )?;
    Ok(count > 0)
}

fn parse_report_row(row: &Row<'_>) -> anyhow::Result<CleaningReport> {
    let before_json: String = row.get(6)?;
    let after_json: String = row.get(7)?;
    let status: String = row.get(8)?;
    let submitted_at: String = row.get(9)?;

    Ok(CleaningReport {
        booking_id: row.get(0)?,
        cleaner_id: row.get(1)?,
        arrival_time: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        notes: row.get(5)?,
        before_photos: serde_json::from_str(&before_json)?,
        after_photos: serde_json::from_str(&after_json)?,
        status: ReportStatus::parse(&status),
        submitted_at: parse_ts(&submitted_at)?,
    })
}

// ── Reviews ──

pub fn insert_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, booking_id, client_id, client_name, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            review.id,
            review.booking_id,
            review.client_id,
            review.client_name,
            review.rating,
            review.comment,
            fmt_ts(&review.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_reviews(conn: &Connection) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, client_id, client_name, rating, comment, created_at
         FROM reviews ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

pub fn get_reviews_for_bookings(
    conn: &Connection,
    booking_ids: &[String],
) -> anyhow::Result<Vec<Review>> {
    let ids_json = serde_json::to_string(booking_ids)?;
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, client_id, client_name, rating, comment, created_at
         FROM reviews WHERE booking_id IN (SELECT value FROM json_each(?1))
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![ids_json], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

fn parse_review_row(row: &Row<'_>) -> anyhow::Result<Review> {
    let created_at: String = row.get(6)?;
    Ok(Review {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        client_id: row.get(2)?,
        client_name: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: parse_ts(&created_at)?,
    })
}
