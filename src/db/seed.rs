use crate::catalog::repository;
use crate::db::models::SpareFields;
use crate::state::DbPool;

/// (name, manufacturer, category, unit, description)
const SAMPLE_SPARES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Small Form-Factor Pluggable Transceiver",
        "Fiber Optic",
        "Optics",
        "https://bit.ly/2QAkSjF",
        "for 10Gb eth LC",
    ),
    (
        "Outdoor Unit",
        "Nokia",
        "Microwave",
        "https://bit.ly/2QEsbqB",
        "for 1Gb 6GHz",
    ),
    (
        "Handheld Transceiver",
        "Motorola",
        "UHF",
        "https://bit.ly/2AQXXXm",
        "for 380MHz",
    ),
    (
        "SwitchRouter",
        "Cisco",
        "IP_Networks",
        "https://bit.ly/2UjD68k",
        "for 24 points eth",
    ),
    (
        "LNB",
        "Hughes Networks",
        "Satelital_Networks",
        "https://bit.ly/2BS6tHw",
        "Satelital Receiver",
    ),
];

/// Ensure the admin account exists and, on an empty catalog, add the sample
/// spares owned by it. Returns the number of spares inserted.
pub fn seed_catalog(pool: &DbPool, admin_email: &str) -> anyhow::Result<usize> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let admin_id = repository::find_or_create_user(&tx, "admin", admin_email, None, "seed")?;

    if repository::count_spares(&tx)? > 0 {
        tx.commit()?;
        tracing::info!("Catalog already populated, skipping sample spares");
        return Ok(0);
    }

    for (name, manufacturer, category, unit, description) in SAMPLE_SPARES {
        let fields = SpareFields {
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            category: category.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
        };
        repository::insert_spare(&tx, &fields, admin_id)?;
    }
    tx.commit()?;

    tracing::info!("Added {} sample spares", SAMPLE_SPARES.len());
    Ok(SAMPLE_SPARES.len())
}
