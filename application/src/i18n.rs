//! Localization of user-facing messages.

use smart_default::SmartDefault;

/// Language of user-facing messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub enum Locale {
    /// English.
    #[default]
    En,

    /// German.
    De,
}

impl Locale {
    /// Picks the [`Locale`] preferred by the provided `Accept-Language` header
    /// value.
    ///
    /// Language ranges are weighted by their `q` values. Unsupported and
    /// malformed ranges are skipped, falling back to [`Locale::default()`].
    #[must_use]
    pub fn negotiate(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';').map(str::trim);
                let tag = parts.next()?;
                let q = parts
                    .find_map(|p| p.strip_prefix("q="))
                    .map_or(Some(1.0), |q| q.parse::<f32>().ok())?;
                let locale = Self::from_tag(tag)?;
                (q > 0.0).then_some((locale, q))
            })
            .fold(None, |best: Option<(Self, f32)>, (l, q)| match best {
                Some((_, best_q)) if best_q >= q => best,
                _ => Some((l, q)),
            })
            .map(|(l, _)| l)
            .unwrap_or_default()
    }

    /// Parses a [`Locale`] out of a language tag, like `de-CH`.
    fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?;
        if primary.eq_ignore_ascii_case("en") {
            Some(Self::En)
        } else if primary.eq_ignore_ascii_case("de") {
            Some(Self::De)
        } else {
            None
        }
    }

    /// Returns the message under the provided `key` in this [`Locale`].
    ///
    /// Keys are either error codes (`BOOKING_CONFLICT`) or dotted message
    /// keys (`booking.confirmed`, `amenity.wifi`). English error messages are
    /// defined by the errors themselves, so [`None`] is returned for them.
    #[must_use]
    pub fn translate(self, key: &str) -> Option<&'static str> {
        match self {
            Self::En => en(key),
            Self::De => de(key),
        }
    }
}

/// English messages.
fn en(key: &str) -> Option<&'static str> {
    Some(match key {
        "auth.registered" => "Registration successful",
        "auth.logged_in" => "Login successful",
        "property.created" => "Property created successfully",
        "property.updated" => "Property updated successfully",
        "property.archived" => "Property archived successfully",
        "availability.updated" => "Availability updated successfully",
        "booking.confirmed" => "Booking confirmed",
        "booking.requested" => "Booking request sent to the host",
        "booking.approved" => "Booking approved",
        "booking.rejected" => "Booking rejected",
        "booking.cancelled" => "Booking cancelled",

        "amenity.wifi" => "Wi-Fi",
        "amenity.heating" => "Heating",
        "amenity.air_conditioning" => "Air conditioning",
        "amenity.hot_water" => "Hot water",
        "amenity.kitchen" => "Kitchen",
        "amenity.towels" => "Towels",
        "amenity.bed_linens" => "Bed linens",
        "amenity.soap" => "Soap",
        "amenity.toilet_paper" => "Toilet paper",
        "amenity.tv" => "TV",
        "amenity.washing_machine" => "Washing machine",
        "amenity.dryer" => "Dryer",
        "amenity.dishwasher" => "Dishwasher",
        "amenity.coffee_maker" => "Coffee maker",
        "amenity.microwave" => "Microwave",
        "amenity.refrigerator" => "Refrigerator",
        "amenity.oven" => "Oven",
        "amenity.iron" => "Iron",
        "amenity.hair_dryer" => "Hair dryer",
        "amenity.desk_workspace" => "Desk workspace",
        "amenity.bbq_grill" => "BBQ grill",
        "amenity.fireplace" => "Fireplace",
        "amenity.piano" => "Piano",
        "amenity.pool_table" => "Pool table",
        "amenity.free_parking" => "Free parking",
        "amenity.paid_parking" => "Paid parking",
        "amenity.gym" => "Gym",
        "amenity.pool" => "Pool",
        "amenity.hot_tub" => "Hot tub",
        "amenity.sauna" => "Sauna",
        "amenity.beach_access" => "Beach access",
        "amenity.waterfront" => "Waterfront",
        "amenity.garden" => "Garden",
        "amenity.patio_balcony" => "Patio or balcony",
        "amenity.sea_view" => "Sea view",
        "amenity.smoke_detector" => "Smoke detector",
        "amenity.carbon_monoxide_detector" => "Carbon monoxide detector",
        "amenity.fire_extinguisher" => "Fire extinguisher",
        "amenity.first_aid_kit" => "First aid kit",
        "amenity.security_cameras" => "Security cameras",
        "amenity.lock_on_bedroom_door" => "Lock on bedroom door",
        "amenity.wheelchair_accessible" => "Wheelchair accessible",
        "amenity.elevator" => "Elevator",
        "amenity.ground_floor_access" => "Ground floor access",
        "amenity.wide_doorways" => "Wide doorways",

        _ => return None,
    })
}

/// German messages.
fn de(key: &str) -> Option<&'static str> {
    Some(match key {
        "INTERNAL_SERVER_ERROR" => "Interner Serverfehler",
        "INVALID_BODY" => {
            "Anfrageinhalt ist fehlerhaft oder unvollständig"
        }
        "INVALID_PARAMETERS" => "Abfrageparameter sind fehlerhaft",
        "INVALID_PATH" => "Ressourcenkennung ist fehlerhaft",
        "INVALID_HEADER" => "Anfrage-Header ist fehlerhaft",
        "AUTHORIZATION_REQUIRED" => "Anmeldung erforderlich",
        "INVALID_TOKEN" => "Anmeldetoken ist ungültig oder abgelaufen",
        "USER_NOT_EXISTS" => "Benutzer existiert nicht",
        "EMAIL_OCCUPIED" => "E-Mail-Adresse ist bereits registriert",
        "WRONG_CREDENTIALS" => "E-Mail-Adresse oder Passwort ist falsch",
        "INVALID_EMAIL" => "E-Mail-Adresse ist ungültig",
        "INVALID_PASSWORD" => "Passwort muss 8 bis 128 Zeichen lang sein",
        "INVALID_NAME" => {
            "Vor- und Nachname müssen 1 bis 100 Zeichen lang sein"
        }
        "INVALID_PHONE" => "Telefonnummer muss 7 bis 15 Ziffern enthalten",
        "USER_NOT_HOST" => "Nur Gastgeber dürfen Unterkünfte anbieten",
        "INVALID_DATES" => "Datumsbereich ist ungültig",
        "INVALID_PAGINATION" => {
            "Seite muss positiv sein und das Limit zwischen 1 und 100 liegen"
        }
        "PROPERTY_NOT_EXISTS" => "Unterkunft nicht gefunden",
        "NOT_PROPERTY_HOST" => "Sie sind nicht Gastgeber dieser Unterkunft",
        "INVALID_TITLE" => "Titel muss 3 bis 255 Zeichen lang sein",
        "INVALID_DESCRIPTION" => {
            "Beschreibung muss 20 bis 10000 Zeichen lang sein"
        }
        "INVALID_ADDRESS" => {
            "Adresse, Stadt, Postleitzahl und Land dürfen nicht leer sein"
        }
        "INVALID_LOCATION" => {
            "Breiten- und Längengrad müssen gemeinsam und gültig angegeben \
             werden"
        }
        "INVALID_ROOMS" => {
            "Gästeanzahl, Schlafzimmer, Betten oder Badezimmer sind \
             ungültig"
        }
        "INVALID_BASE_PRICE" => {
            "Grundpreis muss zwischen 1 und 100000 liegen"
        }
        "INVALID_CLEANING_FEE" => {
            "Reinigungsgebühr muss zwischen 0 und 10000 liegen"
        }
        "AMENITY_NOT_EXISTS" => "Einige Ausstattungsmerkmale existieren nicht",
        "INVALID_BOUNDS" => "Kartenausschnitt ist ungültig",
        "NO_DATES" => "Keine Daten zum Bearbeiten",
        "NO_FIELDS" => "Keine Felder zum Ändern",
        "TOO_MANY_DATES" => "Zu viele Daten in einer Bearbeitung",
        "RESERVED_STATUS" => {
            "Nur die Status `available` und `blocked` können manuell \
             gesetzt werden"
        }
        "INVALID_PRICE" => "Preis darf nicht negativ sein",
        "INVALID_NOTES" => "Notizen dürfen höchstens 500 Zeichen lang sein",
        "BOOKING_NOT_EXISTS" => "Buchung nicht gefunden",
        "NOT_BOOKING_PARTICIPANT" => {
            "Sie sind weder Gast noch Gastgeber dieser Buchung"
        }
        "NOT_BOOKING_HOST" => "Sie sind nicht Gastgeber dieser Buchung",
        "INVALID_TRANSITION" => {
            "Buchung kann in ihrem aktuellen Status nicht geändert werden"
        }
        "BOOKING_CONFLICT" => {
            "Die Daten sind bereits durch eine andere Buchung belegt"
        }
        "DATES_NOT_AVAILABLE" => "Einige Daten sind nicht verfügbar",
        "CAPACITY_EXCEEDED" => {
            "Die Gästeanzahl übersteigt die Kapazität der Unterkunft"
        }
        "CHECK_IN_PASSED" => "Das Anreisedatum liegt in der Vergangenheit",
        "NO_GUESTS" => "Mindestens ein Gast ist erforderlich",
        "OWN_PROPERTY" => {
            "Gastgeber können ihre eigenen Unterkünfte nicht buchen"
        }
        "PROPERTY_NOT_BOOKABLE" => "Unterkunft ist nicht buchbar",
        "UNPRICEABLE" => "Für den Aufenthalt kann kein Preis ermittelt werden",
        "INVALID_SPECIAL_REQUESTS" => {
            "Sonderwünsche dürfen höchstens 1000 Zeichen lang sein"
        }
        "INVALID_REASON" => "Begründung darf höchstens 500 Zeichen lang sein",

        "auth.registered" => "Registrierung erfolgreich",
        "auth.logged_in" => "Anmeldung erfolgreich",
        "property.created" => "Unterkunft erfolgreich erstellt",
        "property.updated" => "Unterkunft erfolgreich aktualisiert",
        "property.archived" => "Unterkunft erfolgreich archiviert",
        "availability.updated" => "Verfügbarkeit erfolgreich aktualisiert",
        "booking.confirmed" => "Buchung bestätigt",
        "booking.requested" => "Buchungsanfrage an den Gastgeber gesendet",
        "booking.approved" => "Buchung angenommen",
        "booking.rejected" => "Buchung abgelehnt",
        "booking.cancelled" => "Buchung storniert",

        "amenity.wifi" => "WLAN",
        "amenity.heating" => "Heizung",
        "amenity.air_conditioning" => "Klimaanlage",
        "amenity.hot_water" => "Warmwasser",
        "amenity.kitchen" => "Küche",
        "amenity.towels" => "Handtücher",
        "amenity.bed_linens" => "Bettwäsche",
        "amenity.soap" => "Seife",
        "amenity.toilet_paper" => "Toilettenpapier",
        "amenity.tv" => "Fernseher",
        "amenity.washing_machine" => "Waschmaschine",
        "amenity.dryer" => "Wäschetrockner",
        "amenity.dishwasher" => "Geschirrspüler",
        "amenity.coffee_maker" => "Kaffeemaschine",
        "amenity.microwave" => "Mikrowelle",
        "amenity.refrigerator" => "Kühlschrank",
        "amenity.oven" => "Backofen",
        "amenity.iron" => "Bügeleisen",
        "amenity.hair_dryer" => "Haartrockner",
        "amenity.desk_workspace" => "Arbeitsplatz",
        "amenity.bbq_grill" => "Grill",
        "amenity.fireplace" => "Kamin",
        "amenity.piano" => "Klavier",
        "amenity.pool_table" => "Billardtisch",
        "amenity.free_parking" => "Kostenloser Parkplatz",
        "amenity.paid_parking" => "Kostenpflichtiger Parkplatz",
        "amenity.gym" => "Fitnessraum",
        "amenity.pool" => "Pool",
        "amenity.hot_tub" => "Whirlpool",
        "amenity.sauna" => "Sauna",
        "amenity.beach_access" => "Strandzugang",
        "amenity.waterfront" => "Direkt am Wasser",
        "amenity.garden" => "Garten",
        "amenity.patio_balcony" => "Terrasse oder Balkon",
        "amenity.sea_view" => "Meerblick",
        "amenity.smoke_detector" => "Rauchmelder",
        "amenity.carbon_monoxide_detector" => "Kohlenmonoxidmelder",
        "amenity.fire_extinguisher" => "Feuerlöscher",
        "amenity.first_aid_kit" => "Erste-Hilfe-Set",
        "amenity.security_cameras" => "Überwachungskameras",
        "amenity.lock_on_bedroom_door" => "Abschließbares Schlafzimmer",
        "amenity.wheelchair_accessible" => "Rollstuhlgerecht",
        "amenity.elevator" => "Aufzug",
        "amenity.ground_floor_access" => "Ebenerdiger Zugang",
        "amenity.wide_doorways" => "Breite Türen",

        _ => return None,
    })
}

#[cfg(test)]
mod spec {
    use super::Locale;

    #[test]
    fn negotiates_accept_language() {
        for (header, expected) in [
            ("de", Locale::De),
            ("de-CH, en;q=0.5", Locale::De),
            ("en-US,en;q=0.9,de;q=0.8", Locale::En),
            ("fr-FR, de;q=0.7, en;q=0.3", Locale::De),
            ("fr, es", Locale::En),
            ("de;q=0", Locale::En),
            ("de;q=oops, en;q=0.1", Locale::En),
            ("", Locale::En),
        ] {
            assert_eq!(Locale::negotiate(header), expected, "{header}");
        }
    }

    #[test]
    fn translates_messages_and_amenities() {
        assert_eq!(Locale::En.translate("amenity.wifi"), Some("Wi-Fi"));
        assert_eq!(Locale::De.translate("amenity.wifi"), Some("WLAN"));
        assert_eq!(
            Locale::De.translate("booking.confirmed"),
            Some("Buchung bestätigt"),
        );
        assert_eq!(Locale::En.translate("BOOKING_CONFLICT"), None);
        assert!(Locale::De.translate("BOOKING_CONFLICT").is_some());
        assert_eq!(Locale::De.translate("amenity.unknown"), None);
        assert_eq!(
            Locale::De.translate("auth.registered"),
            Some("Registrierung erfolgreich"),
        );
        assert!(Locale::De.translate("WRONG_CREDENTIALS").is_some());
        assert_eq!(
            Locale::En.translate("property.archived"),
            Some("Property archived successfully"),
        );
    }
}
