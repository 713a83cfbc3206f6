use url::Url;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// UK agent and portal search pages crawled by default
pub const AGENT_SITES: &[&str] = &[
    "https://www.rightmove.co.uk/",
    "https://www.zoopla.co.uk/",
    "https://www.onthemarket.com/",
    "https://www.primelocation.com/",
    "https://www.boomin.com/",
    "https://www.nestoria.co.uk/",
    "https://www.gumtree.com/property-to-rent/",
    "https://www.openrent.co.uk/",
    "https://www.thehouseshop.com/",
    "https://www.knightfrank.co.uk/",
    "https://www.hamptons.co.uk/",
    "https://www.struttandparker.com/",
    "https://www.chestertons.co.uk/",
    "https://www.winkworth.co.uk/",
    "https://www.your-move.co.uk/",
    "https://www.reedsrains.co.uk/",
    "https://www.connells.co.uk/",
    "https://www.countrywide.co.uk/",
    "https://www.bairstoweves.co.uk/",
    "https://www.belvoir.co.uk/",
    "https://www.hunters.com/",
    "https://www.yopa.co.uk/",
    "https://www.purplebricks.co.uk/",
    "https://www.jackson-stops.co.uk/",
    "https://www.dexters.co.uk/",
    "https://www.jll.co.uk/",
    "https://www.cbre.co.uk/",
    "https://www.fineandcountry.com/",
    "https://www.haart.co.uk/",
    "https://www.mccarthyandstone.co.uk/",
    "https://www.themodernhouse.com/",
    "https://www.propertypal.com/",
    "https://www.propertyheads.com/",
    "https://www.mouseprice.com/",
    "https://www.findaproperty.com/",
    "https://www.mashroom.co.uk/",
    "https://www.carterjonas.co.uk/",
    "https://www.movehut.co.uk/",
    "https://www.home.co.uk/",
    "https://www.rightmove.co.uk/commercial-property.html/",
    "https://www.zoopla.co.uk/for-sale/commercial-property/",
    "https://thenegotiator.co.uk/",
];

/// Portals whose search results only appear after JavaScript runs
pub const DYNAMIC_DOMAINS: &[&str] = &[
    "rightmove.co.uk",
    "zoopla.co.uk",
    "onthemarket.com",
    "primelocation.com",
    "purplebricks.co.uk",
];

/// Host of `site` without a leading `www.`
pub fn site_domain(site: &str) -> Option<String> {
    let url = Url::parse(site).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

pub fn is_dynamic(site: &str) -> bool {
    site_domain(site)
        .map(|domain| DYNAMIC_DOMAINS.contains(&domain.as_str()))
        .unwrap_or(false)
}
