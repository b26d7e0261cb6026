//! In-memory repositories backing handler tests.
use super::*;
use actix_web::cookie::Cookie;
use hh_auth::*;
use hh_core::Error;
use hh_core::ID;
use hh_core::Unique;
use hh_database::Check;
use hh_integrations::*;
use hh_listings::*;
use std::sync::Arc;
use std::sync::Mutex;

pub const SECRET: &[u8] = b"test-secret";

/// Build a test service with the full route table behind the gate.
macro_rules! app {
    ($services:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::from_fn(hh_auth::gatekeeper))
                .app_data(crate::json())
                .configure(|cfg| $services.register(cfg))
                .configure(crate::routes),
        )
        .await
    };
}
pub(crate) use app;

#[derive(Default)]
pub struct Memory {
    users: Mutex<Vec<(Member, String)>>,
    listings: Mutex<Vec<Listing>>,
    viewings: Mutex<Vec<Viewing>>,
    notes: Mutex<Vec<Note>>,
    scores: Mutex<Vec<Score>>,
    preferences: Mutex<Vec<Preferences>>,
    areas: Mutex<Vec<AreaPreference>>,
    budget: Mutex<Option<Budget>>,
}

/// Geocoder that places every address at the same spot.
pub struct Fixed;

#[async_trait::async_trait]
impl Geocoder for Fixed {
    async fn locate(&self, address: &str) -> Option<(f64, f64)> {
        Some((40.7128, -74.006)).filter(|_| !address.contains("nowhere"))
    }
}

/// Scraper that echoes the URL back as the title.
pub struct Echo;

#[async_trait::async_trait]
impl Scraper for Echo {
    async fn preview(&self, url: &str) -> Preview {
        Preview {
            url: url.to_string(),
            title: Some(format!("Page at {}", url)),
            ..Preview::default()
        }
    }
}

impl Memory {
    /// Fresh store plus the services wired to it. Photos go to `uploads`.
    pub fn services(uploads: &std::path::Path) -> (Arc<Self>, Services) {
        let memory = Arc::new(Self::default());
        let services = Services {
            crypto: web::Data::new(Crypto::new(SECRET)),
            cookie: web::Data::new(SessionCookie::new(false)),
            credentials: web::Data::from(memory.clone() as Arc<dyn Credentials>),
            listings: web::Data::from(memory.clone() as Arc<dyn Listings>),
            household: web::Data::from(memory.clone() as Arc<dyn Household>),
            check: web::Data::from(memory.clone() as Arc<dyn Check>),
            geocoder: web::Data::from(Arc::new(Fixed) as Arc<dyn Geocoder>),
            scraper: web::Data::from(Arc::new(Echo) as Arc<dyn Scraper>),
            store: web::Data::from(Arc::new(Disk::new(uploads, "/uploads")) as Arc<dyn ObjectStore>),
            uploads: web::Data::new(Uploads::default()),
        };
        (memory, services)
    }

    /// Register a member with a real password digest.
    pub fn enroll(&self, username: &str, display: &str, admin: bool, password: &str) -> Member {
        let member = Member::new(ID::default(), username.into(), display.into(), admin);
        let hashword = hh_auth::password::hash(password).unwrap();
        self.users.lock().unwrap().push((member.clone(), hashword));
        member
    }

    /// Register a member whose password is never checked.
    pub fn join(&self, username: &str, admin: bool) -> Member {
        let member = Member::new(ID::default(), username.into(), username.into(), admin);
        self.users
            .lock()
            .unwrap()
            .push((member.clone(), String::from("unused")));
        member
    }

    pub fn cookie(member: &Member) -> Cookie<'static> {
        let token = Crypto::new(SECRET).encode(&Claims::new(member)).unwrap();
        SessionCookie::new(false).bake(&token)
    }

    pub fn seed(&self, mut listing: Listing, status: Status) -> Listing {
        listing.status = status;
        self.listings.lock().unwrap().push(listing.clone());
        listing
    }

    pub fn statuses(&self) -> Vec<(ID<Listing>, Status)> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .map(|l| (l.id, l.status))
            .collect()
    }

    pub fn stored(&self, id: ID<Listing>) -> Option<Listing> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }
}

fn upsert<T>(items: &Mutex<Vec<T>>, item: &T, same: impl Fn(&T) -> bool)
where
    T: Clone,
{
    let mut items = items.lock().unwrap();
    match items.iter_mut().find(|x| same(x)) {
        Some(x) => *x = item.clone(),
        None => items.push(item.clone()),
    }
}

fn drop_where<T>(items: &Mutex<Vec<T>>, gone: impl Fn(&T) -> bool) -> bool {
    let mut items = items.lock().unwrap();
    let before = items.len();
    items.retain(|x| !gone(x));
    items.len() < before
}

#[async_trait::async_trait]
impl Credentials for Memory {
    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, Error> {
        let ref username = hh_core::normalize(username);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m.username() == username.as_str())
            .cloned())
    }
    async fn member(&self, id: ID<Member>) -> Result<Option<Member>, Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m.id() == id)
            .map(|(m, _)| m.clone()))
    }
    async fn members(&self) -> Result<Vec<Member>, Error> {
        Ok(self.users.lock().unwrap().iter().map(|(m, _)| m.clone()).collect())
    }
    async fn hashword(&self, id: ID<Member>) -> Result<Option<String>, Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m.id() == id)
            .map(|(_, h)| h.clone()))
    }
    async fn create(&self, member: &Member, hashword: &str) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(m, _)| m.username() == member.username()) {
            return Err(Error::conflict(format!(
                "username '{}' is already taken",
                member.username()
            )));
        }
        users.push((member.clone(), hashword.to_string()));
        Ok(())
    }
    async fn update(&self, member: &Member, hashword: Option<&str>) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        if let Some((m, h)) = users.iter_mut().find(|(m, _)| m.id() == member.id()) {
            *m = member.clone();
            if let Some(hashword) = hashword {
                *h = hashword.to_string();
            }
        }
        Ok(())
    }
    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        if let Some((_, h)) = users.iter_mut().find(|(m, _)| m.id() == id) {
            *h = hashword.to_string();
        }
        Ok(())
    }
    async fn delete(&self, id: ID<Member>) -> Result<bool, Error> {
        Ok(drop_where(&self.users, |(m, _)| m.id() == id))
    }
    async fn headcount(&self) -> Result<usize, Error> {
        Ok(self.users.lock().unwrap().len())
    }
}

#[async_trait::async_trait]
impl Listings for Memory {
    async fn listings(&self, status: Option<Status>) -> Result<Vec<Listing>, Error> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| status.is_none_or(|s| l.status == s))
            .cloned()
            .collect())
    }
    async fn listing(&self, id: ID<Listing>) -> Result<Option<Listing>, Error> {
        Ok(self.stored(id))
    }
    async fn insert(&self, listing: &Listing) -> Result<(), Error> {
        self.listings.lock().unwrap().push(listing.clone());
        Ok(())
    }
    async fn update(&self, listing: &Listing, status: Option<Status>) -> Result<Option<Listing>, Error> {
        let mut listings = self.listings.lock().unwrap();
        Ok(listings.iter_mut().find(|l| l.id == listing.id).map(|l| {
            *l = Listing {
                photos: std::mem::take(&mut l.photos),
                status: status.unwrap_or(l.status),
                ..listing.clone()
            };
            l.clone()
        }))
    }
    async fn remove(&self, id: ID<Listing>) -> Result<bool, Error> {
        let removed = drop_where(&self.listings, |l| l.id == id);
        drop_where(&self.viewings, |v| v.listing_id == id);
        drop_where(&self.notes, |n| n.listing_id == id);
        drop_where(&self.scores, |s| s.listing_id == id);
        Ok(removed)
    }
    async fn select(&self, id: ID<Listing>) -> Result<Option<Listing>, Error> {
        let mut listings = self.listings.lock().unwrap();
        if !listings.iter().any(|l| l.id == id) {
            return Ok(None);
        }
        for listing in listings.iter_mut() {
            match (listing.id == id, listing.status) {
                (true, _) => listing.status = Status::Selected,
                (false, Status::Active | Status::Selected) => listing.status = Status::Archived,
                (false, Status::Archived) => continue,
            }
            listing.touch();
        }
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }
    async fn attach(&self, id: ID<Listing>, urls: &[String]) -> Result<Option<Listing>, Error> {
        let mut listings = self.listings.lock().unwrap();
        Ok(listings.iter_mut().find(|l| l.id == id).map(|l| {
            l.photos.extend_from_slice(urls);
            l.touch();
            l.clone()
        }))
    }
    async fn viewings(&self, listing: ID<Listing>) -> Result<Vec<Viewing>, Error> {
        let mut found = self
            .viewings
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.listing_id == listing)
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by_key(|v| v.scheduled_at);
        Ok(found)
    }
    async fn viewing(&self, id: ID<Viewing>) -> Result<Option<Viewing>, Error> {
        Ok(self
            .viewings
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }
    async fn schedule(&self, viewing: &Viewing) -> Result<(), Error> {
        self.viewings.lock().unwrap().push(viewing.clone());
        Ok(())
    }
    async fn reschedule(&self, viewing: &Viewing) -> Result<(), Error> {
        upsert(&self.viewings, viewing, |v| v.id == viewing.id);
        Ok(())
    }
    async fn cancel(&self, id: ID<Viewing>) -> Result<bool, Error> {
        Ok(drop_where(&self.viewings, |v| v.id == id))
    }
    async fn notes(&self, listing: ID<Listing>) -> Result<Vec<Note>, Error> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.listing_id == listing)
            .cloned()
            .collect())
    }
    async fn note(&self, id: ID<Note>) -> Result<Option<Note>, Error> {
        Ok(self.notes.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }
    async fn annotate(&self, note: &Note) -> Result<(), Error> {
        self.notes.lock().unwrap().push(note.clone());
        Ok(())
    }
    async fn revise(&self, note: &Note) -> Result<(), Error> {
        upsert(&self.notes, note, |n| n.id == note.id);
        Ok(())
    }
    async fn erase(&self, id: ID<Note>) -> Result<bool, Error> {
        Ok(drop_where(&self.notes, |n| n.id == id))
    }
    async fn score(&self, listing: ID<Listing>) -> Result<Option<Score>, Error> {
        Ok(self
            .scores
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.listing_id == listing)
            .cloned())
    }
    async fn rate(&self, score: &Score) -> Result<(), Error> {
        upsert(&self.scores, score, |s| s.listing_id == score.listing_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Household for Memory {
    async fn preferences(&self, user: ID<Member>) -> Result<Option<Preferences>, Error> {
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user)
            .cloned())
    }
    async fn prefer(&self, preferences: &Preferences) -> Result<(), Error> {
        upsert(&self.preferences, preferences, |p| {
            p.user_id == preferences.user_id
        });
        Ok(())
    }
    async fn areas(&self, user: ID<Member>) -> Result<Vec<AreaPreference>, Error> {
        Ok(self
            .areas
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect())
    }
    async fn area(&self, user: ID<Member>, name: &str) -> Result<Option<AreaPreference>, Error> {
        Ok(self
            .areas
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user_id == user && a.area_name == name)
            .cloned())
    }
    async fn add_area(&self, area: &AreaPreference) -> Result<(), Error> {
        let mut areas = self.areas.lock().unwrap();
        if areas
            .iter()
            .any(|a| a.user_id == area.user_id && a.area_name == area.area_name)
        {
            return Err(Error::conflict(format!(
                "area '{}' already has a preference",
                area.area_name
            )));
        }
        areas.push(area.clone());
        Ok(())
    }
    async fn update_area(&self, area: &AreaPreference) -> Result<(), Error> {
        upsert(&self.areas, area, |a| {
            a.user_id == area.user_id && a.area_name == area.area_name
        });
        Ok(())
    }
    async fn remove_area(&self, user: ID<Member>, name: &str) -> Result<bool, Error> {
        Ok(drop_where(&self.areas, |a| {
            a.user_id == user && a.area_name == name
        }))
    }
    async fn budget(&self) -> Result<Option<Budget>, Error> {
        Ok(self.budget.lock().unwrap().clone())
    }
    async fn set_budget(&self, budget: &Budget) -> Result<(), Error> {
        *self.budget.lock().unwrap() = Some(budget.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Check for Memory {
    async fn count(&self, _: &'static str) -> usize {
        0
    }
    async fn alive(&self) -> bool {
        true
    }
}
