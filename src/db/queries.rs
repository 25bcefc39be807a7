pub const INSERT_TRIP: &str = r#"
INSERT INTO trips (id, vehicle_id, trip_date, trip_time, trip_type, start_km, end_km, start_location, end_location, notes, distance_km)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
RETURNING id, vehicle_id, trip_date, trip_time, trip_type, start_km, end_km, start_location, end_location, notes, distance_km;
"#;

pub const SELECT_TRIP_NOTES_FOR_UPDATE: &str = r#"
SELECT notes FROM trips WHERE id = $1 FOR UPDATE;
"#;

pub const UPDATE_TRIP: &str = r#"
UPDATE trips
SET end_km = COALESCE($2, end_km),
    end_location = COALESCE($3, end_location),
    notes = COALESCE($4, notes),
    distance_km = COALESCE($5, distance_km)
WHERE id = $1
RETURNING id, vehicle_id, trip_date, trip_time, trip_type, start_km, end_km, start_location, end_location, notes, distance_km;
"#;

pub const DELETE_TRIP: &str = r#"
DELETE FROM trips WHERE id = $1;
"#;

pub const LIST_TRIPS: &str = r#"
SELECT id, vehicle_id, trip_date, trip_time, trip_type, start_km, end_km, start_location, end_location, notes, distance_km
FROM trips
WHERE vehicle_id = $1
  AND ($2::date IS NULL OR trip_date >= $2)
  AND ($3::date IS NULL OR trip_date <= $3)
  AND ($4::text IS NULL OR trip_type = $4)
ORDER BY trip_date DESC, trip_time DESC;
"#;
