//! Semantic fake values backed by the `fake` crate.

use crate::schema::Value;
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, PostCode, StateName, StreetName, StreetSuffix,
};
use fake::faker::company::en::CompanyName;
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::internet::en::{SafeEmail, Username, IPv4};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;

/// Kind of semantic value a column receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeKind {
    /// 15-digit integer, for external account ids
    BigNumber,
    Uuid,
    Email,
    FirstName,
    LastName,
    Name,
    Username,
    City,
    State,
    Country,
    PostCode,
    Company,
    StreetAddress,
    Phone,
    Url,
    Ip,
    CreditCard,
    Iban,
    Word,
    Sentence,
    Paragraph,
}

impl std::str::FromStr for FakeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "big_number" | "number" => Ok(FakeKind::BigNumber),
            "uuid" | "guid" => Ok(FakeKind::Uuid),
            "email" | "safe_email" => Ok(FakeKind::Email),
            "first_name" => Ok(FakeKind::FirstName),
            "last_name" => Ok(FakeKind::LastName),
            "name" | "full_name" => Ok(FakeKind::Name),
            "username" | "user_name" => Ok(FakeKind::Username),
            "city" => Ok(FakeKind::City),
            "state" => Ok(FakeKind::State),
            "country" => Ok(FakeKind::Country),
            "postcode" | "zip" | "zip_code" | "postal_code" => Ok(FakeKind::PostCode),
            "company" | "company_name" => Ok(FakeKind::Company),
            "address" | "street_address" => Ok(FakeKind::StreetAddress),
            "phone" | "phone_number" => Ok(FakeKind::Phone),
            "url" => Ok(FakeKind::Url),
            "ip" | "ipv4" | "ip_address" => Ok(FakeKind::Ip),
            "credit_card" => Ok(FakeKind::CreditCard),
            "iban" => Ok(FakeKind::Iban),
            "word" => Ok(FakeKind::Word),
            "sentence" => Ok(FakeKind::Sentence),
            "paragraph" | "lorem" => Ok(FakeKind::Paragraph),
            _ => Err(format!(
                "Unknown generator: {}. Use: email, name, first_name, last_name, phone, address, \
                 city, state, country, postcode, company, url, uuid, ip, iban, credit_card, \
                 big_number, word, sentence, paragraph",
                s
            )),
        }
    }
}

impl std::fmt::Display for FakeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FakeKind::BigNumber => "big_number",
            FakeKind::Uuid => "uuid",
            FakeKind::Email => "email",
            FakeKind::FirstName => "first_name",
            FakeKind::LastName => "last_name",
            FakeKind::Name => "name",
            FakeKind::Username => "username",
            FakeKind::City => "city",
            FakeKind::State => "state",
            FakeKind::Country => "country",
            FakeKind::PostCode => "postcode",
            FakeKind::Company => "company",
            FakeKind::StreetAddress => "street_address",
            FakeKind::Phone => "phone",
            FakeKind::Url => "url",
            FakeKind::Ip => "ip",
            FakeKind::CreditCard => "credit_card",
            FakeKind::Iban => "iban",
            FakeKind::Word => "word",
            FakeKind::Sentence => "sentence",
            FakeKind::Paragraph => "paragraph",
        };
        f.write_str(name)
    }
}

impl FakeKind {
    /// Produce one value of this kind
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let text: String = match self {
            FakeKind::BigNumber => {
                return Value::Int(rng.random_range(100_000_000_000_000..=999_999_999_999_999));
            }
            FakeKind::Uuid => {
                let bytes: [u8; 16] = rng.random();
                uuid::Builder::from_random_bytes(bytes)
                    .into_uuid()
                    .to_string()
            }
            FakeKind::Email => SafeEmail().fake_with_rng(rng),
            FakeKind::FirstName => FirstName().fake_with_rng(rng),
            FakeKind::LastName => LastName().fake_with_rng(rng),
            FakeKind::Name => Name().fake_with_rng(rng),
            FakeKind::Username => Username().fake_with_rng(rng),
            FakeKind::City => CityName().fake_with_rng(rng),
            FakeKind::State => StateName().fake_with_rng(rng),
            FakeKind::Country => CountryName().fake_with_rng(rng),
            FakeKind::PostCode => PostCode().fake_with_rng(rng),
            FakeKind::Company => CompanyName().fake_with_rng(rng),
            FakeKind::StreetAddress => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                let suffix: String = StreetSuffix().fake_with_rng(rng);
                format!("{} {} {}", number, street, suffix)
            }
            FakeKind::Phone => PhoneNumber().fake_with_rng(rng),
            FakeKind::Url => {
                let host: String = Word().fake_with_rng(rng);
                let path: String = Word().fake_with_rng(rng);
                let tld = ["com", "net", "org", "io"][rng.random_range(0..4)];
                format!(
                    "https://www.{}.{}/{}",
                    host.to_lowercase(),
                    tld,
                    path.to_lowercase()
                )
            }
            FakeKind::Ip => IPv4().fake_with_rng(rng),
            FakeKind::CreditCard => CreditCardNumber().fake_with_rng(rng),
            // Shape only, the checksum is not valid
            FakeKind::Iban => format!(
                "DE{:02}{:04}{:04}{:04}{:04}{:02}",
                rng.random_range(10..99),
                rng.random_range(1000..9999),
                rng.random_range(1000..9999),
                rng.random_range(1000..9999),
                rng.random_range(1000..9999),
                rng.random_range(10..99)
            ),
            FakeKind::Word => Word().fake_with_rng(rng),
            FakeKind::Sentence => Sentence(4..10).fake_with_rng(rng),
            FakeKind::Paragraph => Paragraph(3..6).fake_with_rng(rng),
        };
        Value::Text(text)
    }
}
