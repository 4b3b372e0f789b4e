//! Demo accounts and listings for a fresh store

use tracing::info;

use super::error::MarketError;
use super::models::{NewListing, Role};
use super::password::PasswordHasher;
use super::store::MarketStore;

pub const DEMO_PASSWORD: &str = "123";

const DEMO_USERS: [(&str, Role); 3] = [
    ("admin@vu.lt", Role::Admin),
    ("host@vu.lt", Role::Host),
    ("guest@vu.lt", Role::Guest),
];

// (title, description, price, location, category, image)
const DEMO_LISTINGS: [(&str, &str, f64, &str, &str, &str); 4] = [
    (
        "Prabangus loftas senamiestyje",
        "Aukštos lubos, autentiškos plytos ir modernus interjeras pačioje miesto širdyje. Puikiai tinka poroms ar verslo kelionėms.",
        120.0,
        "Vilnius, Lietuva",
        "Miestas",
        "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800",
    ),
    (
        "Namelis medyje",
        "Pabėkite nuo miesto triukšmo į ramybės oazę. Šis namelis medyje suteiks nepamirštamą patirtį gamtos apsuptyje.",
        85.0,
        "Anykščiai, Lietuva",
        "Gamta",
        "https://external-content.duckduckgo.com/iu/?u=https%3A%2F%2Fs.hdnux.com%2Fphotos%2F01%2F01%2F17%2F10%2F17101347%2F3%2FrawImage.jpg&f=1&nofb=1&ipt=726eb6ab1b025ca8b4e6b7dccde943a3269f29022f11995aff16bdd000548149",
    ),
    (
        "Moderni vila prie jūros",
        "Erdvi vila su vaizdu į kopas. Didelė terasa vakarams stebint saulėlydį ir tiesioginis praėjimas į paplūdimį.",
        210.0,
        "Nida, Lietuva",
        "Pajūris",
        "https://images.unsplash.com/photo-1499793983690-e29da59ef1c2?w=800",
    ),
    (
        "Stilingas butas Kaune",
        "Jaukus, minimalistinis butas šalia Laisvės alėjos. Visi lankytini objektai pasiekiami pėsčiomis.",
        65.0,
        "Kaunas, Lietuva",
        "Miestas",
        "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800",
    ),
];

/// Insert demo data into an empty store
///
/// Returns `Ok(false)` without touching anything when the store already has
/// users or listings.
pub fn seed_demo_data(store: &MarketStore, hasher: &PasswordHasher) -> Result<bool, MarketError> {
    if !store.is_empty()? {
        return Ok(false);
    }

    for (email, role) in DEMO_USERS {
        store.insert_user(email, hasher.hash(DEMO_PASSWORD)?, role)?;
    }

    for (title, description, price, location, category, image) in DEMO_LISTINGS {
        store.create_listing(NewListing {
            title: title.into(),
            description: description.into(),
            price,
            location: location.into(),
            category: category.into(),
            image: image.into(),
            host_email: "host@vu.lt".into(),
        })?;
    }

    info!(
        users = DEMO_USERS.len(),
        listings = DEMO_LISTINGS.len(),
        "Seeded demo data"
    );
    Ok(true)
}
