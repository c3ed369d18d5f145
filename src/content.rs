//! Copy for the marketing page.

pub struct Plan {
    pub name: &'static str,
    pub price: &'static str,
    pub period: &'static str,
    pub summary: &'static str,
    pub features: &'static [&'static str],
    pub highlight: bool,
    pub cta: &'static str,
}

pub struct ComparisonRow {
    pub feature: &'static str,
    pub ours: bool,
    pub marketplace: bool,
    pub spreadsheet: bool,
}

pub struct ProblemSolution {
    pub problem: &'static str,
    pub solution: &'static str,
}

pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const TAGLINE: &str = "Appointments without the back-and-forth.";

pub const HERO_SUBTITLE: &str = "Let clients book, reschedule and pay in seconds while you focus on \
the work. Built for salons, barbers, studios and every local service that runs on a calendar.";

pub const SERVICES: &[&str] = &[
    "Hair salon",
    "Barbershop",
    "Nails",
    "Spa & massage",
    "Fitness & wellness",
    "Tattoo & piercing",
    "Other",
];

pub const BUSINESS_TYPES: &[&str] = &[
    "Salon",
    "Barber",
    "Spa",
    "Studio",
    "Clinic",
    "Other",
];

pub const PROBLEMS: &[ProblemSolution] = &[
    ProblemSolution {
        problem: "Clients text at midnight to ask what's free tomorrow.",
        solution: "A live booking page shows real availability around the clock.",
    },
    ProblemSolution {
        problem: "No-shows leave gaps you can't refill.",
        solution: "Automatic reminders and deposits keep the calendar full.",
    },
    ProblemSolution {
        problem: "Your schedule lives in a notebook, a spreadsheet and your head.",
        solution: "One calendar for every staff member, synced to every device.",
    },
];

pub const STATS: &[Stat] = &[
    Stat { value: "70%", label: "fewer no-shows with reminders" },
    Stat { value: "5 hrs", label: "saved on scheduling every week" },
    Stat { value: "24/7", label: "online booking for your clients" },
    Stat { value: "0%", label: "commission on your bookings" },
];

pub const COMPARISON: &[ComparisonRow] = &[
    ComparisonRow { feature: "Online booking page", ours: true, marketplace: true, spreadsheet: false },
    ComparisonRow { feature: "Automatic reminders", ours: true, marketplace: true, spreadsheet: false },
    ComparisonRow { feature: "No per-booking commission", ours: true, marketplace: false, spreadsheet: true },
    ComparisonRow { feature: "Your own client list", ours: true, marketplace: false, spreadsheet: true },
    ComparisonRow { feature: "Deposits and payments", ours: true, marketplace: true, spreadsheet: false },
    ComparisonRow { feature: "Team calendars", ours: true, marketplace: false, spreadsheet: false },
];

pub const PLANS: &[Plan] = &[
    Plan {
        name: "Starter",
        price: "$0",
        period: "forever",
        summary: "For solo professionals getting their calendar online.",
        features: &["1 staff calendar", "Unlimited bookings", "Email reminders"],
        highlight: false,
        cta: "Join the waitlist",
    },
    Plan {
        name: "Pro",
        price: "$19",
        period: "per month",
        summary: "For busy chairs that need fewer gaps and faster payments.",
        features: &[
            "Up to 5 staff calendars",
            "SMS reminders",
            "Deposits and card payments",
            "Client notes and history",
        ],
        highlight: true,
        cta: "Get early access",
    },
    Plan {
        name: "Business",
        price: "$49",
        period: "per month",
        summary: "For multi-location teams with their own brand.",
        features: &[
            "Unlimited staff",
            "Multiple locations",
            "Custom booking domain",
            "Priority support",
        ],
        highlight: false,
        cta: "Talk to us",
    },
];
