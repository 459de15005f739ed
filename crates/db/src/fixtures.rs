use crate::repositories::StoreError;
use crate::DbPool;

/// Canonical outlet seed dataset. Loaded once when the table is empty;
/// normal operation never writes to `outlets` again.
#[derive(Clone, Copy, Debug)]
pub struct SeedOutlet {
    pub name: &'static str,
    pub address: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub services: &'static str,
    pub hours: &'static str,
    pub parking_available: bool,
    pub wifi_available: bool,
}

pub const SEED_OUTLETS: &[SeedOutlet] = &[
    SeedOutlet {
        name: "Kopi Corner - Binjai 8 Premium SOHO",
        address: "G04, Pangsapuri Servis Binjai 8, No. 2, Lorong Binjai",
        city: "Kuala Lumpur",
        state: "Kuala Lumpur",
        services: "coffee,food,wifi,parking,dine_in,takeaway",
        hours: "07:00-22:00",
        parking_available: true,
        wifi_available: true,
    },
    SeedOutlet {
        name: "Kopi Corner - Pavilion Elite",
        address: "Lot 5.01, Level 5, Pavilion Elite, 168 Jalan Bukit Bintang",
        city: "Kuala Lumpur",
        state: "Kuala Lumpur",
        services: "coffee,food,wifi,dine_in,takeaway",
        hours: "10:00-22:00",
        parking_available: false,
        wifi_available: true,
    },
    SeedOutlet {
        name: "Kopi Corner - Mid Valley Megamall",
        address: "LG-088, Lower Ground Floor, Mid Valley Megamall, Lingkaran Syed Putra",
        city: "Kuala Lumpur",
        state: "Kuala Lumpur",
        services: "coffee,food,parking,dine_in,takeaway",
        hours: "10:00-22:00",
        parking_available: true,
        wifi_available: false,
    },
    SeedOutlet {
        name: "Kopi Corner - Atria Shopping Gallery",
        address: "C01A, Concourse Floor, Atria Shopping Gallery, Jalan SS 22/23, Damansara Jaya",
        city: "Petaling Jaya",
        state: "Selangor",
        services: "coffee,food,wifi,drive_thru,parking,dine_in,takeaway",
        hours: "08:00-22:00",
        parking_available: true,
        wifi_available: true,
    },
    SeedOutlet {
        name: "Kopi Corner - Jaya One",
        address: "Block K, Jaya One, 72A Jalan Profesor Diraja Ungku Aziz",
        city: "Petaling Jaya",
        state: "Selangor",
        services: "coffee,food,wifi,dine_in,takeaway",
        hours: "08:00-21:00",
        parking_available: false,
        wifi_available: true,
    },
    SeedOutlet {
        name: "Kopi Corner - Sunway Pyramid",
        address: "LG2.72, Sunway Pyramid, 3 Jalan PJS 11/15, Bandar Sunway",
        city: "Subang Jaya",
        state: "Selangor",
        services: "coffee,food,parking,takeaway",
        hours: "10:00-22:00",
        parking_available: true,
        wifi_available: false,
    },
    SeedOutlet {
        name: "Kopi Corner - Setia City Mall",
        address: "G-23, Setia City Mall, 7 Persiaran Setia Dagang, Setia Alam",
        city: "Shah Alam",
        state: "Selangor",
        services: "coffee,food,wifi,parking,drive_thru,takeaway",
        hours: "09:00-22:00",
        parking_available: true,
        wifi_available: true,
    },
    SeedOutlet {
        name: "Kopi Corner - Georgetown Heritage",
        address: "88 Lebuh Armenian, George Town",
        city: "George Town",
        state: "Penang",
        services: "coffee,food,dine_in,takeaway",
        hours: "08:00-20:00",
        parking_available: false,
        wifi_available: false,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub already_seeded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Populate the outlet table from [`SEED_OUTLETS`] when it is empty.
/// A non-empty table is left untouched, which makes seeding idempotent.
pub async fn seed_if_empty(pool: &DbPool) -> Result<SeedResult, StoreError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM outlets").fetch_one(pool).await?;
    if count > 0 {
        return Ok(SeedResult { inserted: 0, already_seeded: true });
    }

    for outlet in SEED_OUTLETS {
        sqlx::query(
            "INSERT INTO outlets \
             (name, address, city, state, services, hours, parking_available, wifi_available) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(outlet.name)
        .bind(outlet.address)
        .bind(outlet.city)
        .bind(outlet.state)
        .bind(outlet.services)
        .bind(outlet.hours)
        .bind(outlet.parking_available)
        .bind(outlet.wifi_available)
        .execute(pool)
        .await?;
    }

    Ok(SeedResult { inserted: SEED_OUTLETS.len(), already_seeded: false })
}

/// Check that the seeded dataset covers every predicate the query compiler
/// can emit.
pub async fn verify(pool: &DbPool) -> Result<VerificationResult, StoreError> {
    let mut checks = Vec::new();

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM outlets").fetch_one(pool).await?;
    checks.push(("outlet-rows-present", total >= SEED_OUTLETS.len() as i64));

    for (label, condition) in [
        ("kuala-lumpur-coverage", "city LIKE '%Kuala Lumpur%'"),
        ("selangor-coverage", "state LIKE '%Selangor%'"),
        ("parking-coverage", "parking_available = 1"),
        ("wifi-coverage", "wifi_available = 1"),
    ] {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM outlets WHERE {condition}"))
                .fetch_one(pool)
                .await?;
        checks.push((label, count > 0));
    }

    let all_present = checks.iter().all(|(_, passed)| *passed);
    Ok(VerificationResult { all_present, checks })
}

#[cfg(test)]
mod tests {
    use super::{seed_if_empty, verify, SEED_OUTLETS};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seeding_populates_an_empty_table_once() {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let first = seed_if_empty(&pool).await.expect("first seed");
        assert!(!first.already_seeded);
        assert_eq!(first.inserted, SEED_OUTLETS.len());

        let second = seed_if_empty(&pool).await.expect("second seed");
        assert!(second.already_seeded);
        assert_eq!(second.inserted, 0);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM outlets")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, SEED_OUTLETS.len() as i64);

        pool.close().await;
    }

    #[tokio::test]
    async fn verification_passes_on_seeded_data() {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        seed_if_empty(&pool).await.expect("seed");

        let verification = verify(&pool).await.expect("verify");
        assert!(
            verification.all_present,
            "failed checks: {:?}",
            verification
                .checks
                .iter()
                .filter(|(_, passed)| !passed)
                .map(|(label, _)| *label)
                .collect::<Vec<_>>()
        );

        pool.close().await;
    }
}
