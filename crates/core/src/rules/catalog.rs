use crate::classifier::{CompanySize, GoalCategory, IndustryType};
use crate::domain::recommendation::Difficulty;
use crate::rules::{RecommendationRule, UsageBounds};

/// Immutable rule set, built once and shared by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<RecommendationRule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<RecommendationRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec())
    }

    pub fn rules(&self) -> &[RecommendationRule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&RecommendationRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

const ABOVE_SMALL: &[CompanySize] =
    &[CompanySize::Medium, CompanySize::Large, CompanySize::Enterprise];

const fn min_kwh(kwh: f64) -> UsageBounds {
    UsageBounds { min_kwh: Some(kwh), ..UsageBounds::NONE }
}

const fn min_therms(therms: f64) -> UsageBounds {
    UsageBounds { min_therms: Some(therms), ..UsageBounds::NONE }
}

const BASE: RecommendationRule = RecommendationRule {
    id: "",
    title: "",
    description: "",
    category: "Energy Efficiency",
    difficulty: Difficulty::Medium,
    bounds: UsageBounds::NONE,
    industries: &[],
    sizes: &[],
    required_goals: &[],
    cost_savings_factor: 0.0,
    co2_reduction_factor: 0.0,
    base_roi_months: 12,
    implementation_cost_factor: 1.0,
    base_priority: 0.5,
};

/// Declaration order is the tie-break order for equal priority scores.
pub const STANDARD_RULES: &[RecommendationRule] = &[
    // Energy efficiency
    RecommendationRule {
        id: "led_retrofit_basic",
        title: "LED Lighting Retrofit",
        description: "Replace traditional incandescent and fluorescent lighting with \
            energy-efficient LED bulbs throughout the facility.",
        difficulty: Difficulty::Easy,
        bounds: min_kwh(800.0),
        cost_savings_factor: 0.25,
        co2_reduction_factor: 0.25,
        base_roi_months: 18,
        base_priority: 0.8,
        ..BASE
    },
    RecommendationRule {
        id: "hvac_optimization",
        title: "HVAC System Optimization",
        description: "Implement smart thermostats, regular maintenance schedules, and system \
            optimization to improve heating and cooling efficiency.",
        bounds: min_kwh(1_500.0),
        cost_savings_factor: 0.15,
        co2_reduction_factor: 0.15,
        base_roi_months: 24,
        base_priority: 0.7,
        ..BASE
    },
    RecommendationRule {
        id: "smart_power_management",
        title: "Smart Power Management Systems",
        description: "Install smart power strips and automated shutdown systems to eliminate \
            phantom loads and reduce standby power consumption.",
        difficulty: Difficulty::Easy,
        bounds: min_kwh(500.0),
        sizes: ABOVE_SMALL,
        cost_savings_factor: 0.08,
        co2_reduction_factor: 0.08,
        base_roi_months: 12,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "energy_audit_comprehensive",
        title: "Professional Energy Audit",
        description: "Conduct a comprehensive energy audit to identify specific areas of energy \
            waste and optimization opportunities.",
        category: "Assessment",
        difficulty: Difficulty::Easy,
        cost_savings_factor: 0.10,
        co2_reduction_factor: 0.10,
        base_roi_months: 6,
        base_priority: 0.9,
        ..BASE
    },
    RecommendationRule {
        id: "insulation_upgrade",
        title: "Building Insulation Upgrade",
        description: "Improve building insulation in walls, windows, and roofing to reduce heating \
            and cooling energy requirements.",
        difficulty: Difficulty::Hard,
        bounds: UsageBounds {
            min_kwh: Some(2_000.0),
            min_therms: Some(100.0),
            ..UsageBounds::NONE
        },
        cost_savings_factor: 0.20,
        co2_reduction_factor: 0.18,
        base_roi_months: 36,
        implementation_cost_factor: 3.0,
        base_priority: 0.5,
        ..BASE
    },
    RecommendationRule {
        id: "programmable_thermostats",
        title: "Programmable Thermostat Scheduling",
        description: "Schedule heating setbacks for nights and weekends with programmable or \
            connected thermostats.",
        difficulty: Difficulty::Easy,
        bounds: min_therms(50.0),
        cost_savings_factor: 0.06,
        co2_reduction_factor: 0.07,
        base_roi_months: 8,
        implementation_cost_factor: 0.5,
        base_priority: 0.65,
        ..BASE
    },
    RecommendationRule {
        id: "occupancy_lighting_controls",
        title: "Occupancy Sensor Lighting Controls",
        description: "Add occupancy and daylight sensors so lighting in low-traffic spaces \
            switches off automatically.",
        difficulty: Difficulty::Easy,
        bounds: min_kwh(1_000.0),
        cost_savings_factor: 0.07,
        co2_reduction_factor: 0.07,
        base_roi_months: 12,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "boiler_tuneup",
        title: "Boiler and Furnace Tune-Up",
        description: "Service combustion equipment, adjust burner air ratios, and repair steam \
            traps to recover lost heating efficiency.",
        difficulty: Difficulty::Easy,
        bounds: min_therms(200.0),
        cost_savings_factor: 0.08,
        co2_reduction_factor: 0.09,
        base_roi_months: 6,
        implementation_cost_factor: 0.5,
        base_priority: 0.6,
        ..BASE
    },
    // Industry specific
    RecommendationRule {
        id: "server_efficiency_tech",
        title: "Data Center and Server Efficiency",
        description: "Optimize server utilization, implement virtualization, and upgrade to \
            energy-efficient hardware.",
        bounds: min_kwh(2_000.0),
        industries: &[IndustryType::Technology],
        cost_savings_factor: 0.30,
        co2_reduction_factor: 0.30,
        base_roi_months: 18,
        base_priority: 0.8,
        ..BASE
    },
    RecommendationRule {
        id: "motor_efficiency_mfg",
        title: "High-Efficiency Motor Upgrades",
        description: "Replace standard motors with premium efficiency motors and implement \
            variable frequency drives (VFDs).",
        bounds: min_kwh(5_000.0),
        industries: &[IndustryType::Manufacturing],
        cost_savings_factor: 0.25,
        co2_reduction_factor: 0.25,
        base_roi_months: 30,
        base_priority: 0.7,
        ..BASE
    },
    RecommendationRule {
        id: "compressed_air_leaks_mfg",
        title: "Compressed Air Leak Repair Program",
        description: "Survey compressed air lines with ultrasonic detection and repair leaks that \
            waste compressor energy.",
        difficulty: Difficulty::Easy,
        bounds: min_kwh(3_000.0),
        industries: &[IndustryType::Manufacturing],
        cost_savings_factor: 0.10,
        co2_reduction_factor: 0.10,
        base_roi_months: 6,
        implementation_cost_factor: 0.5,
        base_priority: 0.75,
        ..BASE
    },
    RecommendationRule {
        id: "refrigeration_efficiency_retail",
        title: "Refrigeration System Optimization",
        description: "Upgrade to high-efficiency refrigeration systems and implement advanced \
            controls for better energy management.",
        difficulty: Difficulty::Hard,
        bounds: min_kwh(3_000.0),
        industries: &[IndustryType::Retail],
        cost_savings_factor: 0.20,
        co2_reduction_factor: 0.20,
        base_roi_months: 36,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "medical_equipment_efficiency",
        title: "Medical Equipment Energy Management",
        description: "Implement energy-efficient medical equipment scheduling and optimize HVAC \
            for critical areas.",
        bounds: min_kwh(4_000.0),
        industries: &[IndustryType::Healthcare],
        cost_savings_factor: 0.12,
        co2_reduction_factor: 0.12,
        base_roi_months: 24,
        base_priority: 0.7,
        ..BASE
    },
    RecommendationRule {
        id: "guest_room_automation",
        title: "Guest Room Energy Automation",
        description: "Install occupancy-based energy management systems in guest rooms to optimize \
            heating, cooling, and lighting.",
        bounds: min_kwh(2_500.0),
        industries: &[IndustryType::Hospitality],
        cost_savings_factor: 0.18,
        co2_reduction_factor: 0.18,
        base_roi_months: 20,
        base_priority: 0.8,
        ..BASE
    },
    RecommendationRule {
        id: "kitchen_equipment_hospitality",
        title: "Commercial Kitchen Equipment Upgrade",
        description: "Replace aging fryers, ovens, and dishwashers with ENERGY STAR commercial \
            kitchen equipment.",
        bounds: min_therms(150.0),
        industries: &[IndustryType::Hospitality],
        cost_savings_factor: 0.12,
        co2_reduction_factor: 0.14,
        base_roi_months: 24,
        implementation_cost_factor: 2.0,
        base_priority: 0.65,
        ..BASE
    },
    RecommendationRule {
        id: "campus_building_automation_edu",
        title: "Campus Building Automation",
        description: "Tie classroom HVAC and lighting schedules to the academic calendar through a \
            central building automation system.",
        bounds: min_kwh(4_000.0),
        industries: &[IndustryType::Education],
        cost_savings_factor: 0.15,
        co2_reduction_factor: 0.15,
        base_roi_months: 30,
        implementation_cost_factor: 2.5,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "branch_office_energy_fin",
        title: "Branch Office Energy Standardization",
        description: "Standardize lighting, HVAC setpoints, and after-hours equipment shutdown \
            across branch offices.",
        bounds: min_kwh(2_000.0),
        industries: &[IndustryType::Financial],
        cost_savings_factor: 0.12,
        co2_reduction_factor: 0.12,
        base_roi_months: 18,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "warehouse_lighting_logistics",
        title: "High-Bay Warehouse Lighting Upgrade",
        description: "Replace metal-halide high-bay fixtures with LED fixtures and zoned motion \
            controls in warehouses and depots.",
        bounds: min_kwh(3_000.0),
        industries: &[IndustryType::Logistics],
        cost_savings_factor: 0.22,
        co2_reduction_factor: 0.22,
        base_roi_months: 24,
        implementation_cost_factor: 1.5,
        base_priority: 0.7,
        ..BASE
    },
    RecommendationRule {
        id: "fleet_route_optimization",
        title: "Fleet Route Optimization",
        description: "Use route planning and telematics to cut idle time and empty miles across \
            the delivery fleet.",
        difficulty: Difficulty::Easy,
        industries: &[IndustryType::Logistics],
        cost_savings_factor: 0.06,
        co2_reduction_factor: 0.10,
        base_roi_months: 6,
        implementation_cost_factor: 0.5,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "construction_equipment_idle",
        title: "Construction Equipment Idle Reduction",
        description: "Introduce anti-idling policies and auto shut-off on generators and heavy \
            equipment at job sites.",
        difficulty: Difficulty::Easy,
        industries: &[IndustryType::Construction],
        cost_savings_factor: 0.05,
        co2_reduction_factor: 0.08,
        base_roi_months: 6,
        implementation_cost_factor: 0.5,
        base_priority: 0.55,
        ..BASE
    },
    RecommendationRule {
        id: "irrigation_pump_efficiency_ag",
        title: "Irrigation Pump Efficiency Upgrade",
        description: "Retrofit irrigation pumps with variable frequency drives and schedule \
            pumping outside peak tariff hours.",
        bounds: min_kwh(1_500.0),
        industries: &[IndustryType::Agriculture],
        cost_savings_factor: 0.18,
        co2_reduction_factor: 0.18,
        base_roi_months: 24,
        implementation_cost_factor: 1.5,
        base_priority: 0.65,
        ..BASE
    },
    // Company size
    RecommendationRule {
        id: "small_business_basics",
        title: "Small Business Energy Basics",
        description: "Implement simple energy-saving measures like programmable thermostats, LED \
            lighting, and Energy Star appliances.",
        difficulty: Difficulty::Easy,
        sizes: &[CompanySize::Small],
        cost_savings_factor: 0.15,
        co2_reduction_factor: 0.15,
        base_roi_months: 12,
        base_priority: 0.8,
        ..BASE
    },
    RecommendationRule {
        id: "small_business_utility_rebates",
        title: "Utility Rebate and Incentive Review",
        description: "Review utility rebate programs and tax incentives available for planned \
            equipment replacements.",
        category: "Assessment",
        difficulty: Difficulty::Easy,
        sizes: &[CompanySize::Small],
        cost_savings_factor: 0.04,
        co2_reduction_factor: 0.02,
        base_roi_months: 6,
        implementation_cost_factor: 0.25,
        base_priority: 0.7,
        ..BASE
    },
    RecommendationRule {
        id: "medium_business_submetering",
        title: "Energy Submetering and Monitoring",
        description: "Install circuit-level submeters and a monitoring dashboard to expose the \
            largest and most wasteful loads.",
        bounds: min_kwh(3_000.0),
        sizes: &[CompanySize::Medium, CompanySize::Large],
        cost_savings_factor: 0.08,
        co2_reduction_factor: 0.08,
        base_roi_months: 18,
        base_priority: 0.55,
        ..BASE
    },
    RecommendationRule {
        id: "large_facility_retrocommissioning",
        title: "Building Retro-Commissioning",
        description: "Engage a commissioning agent to re-tune building controls, sequences, and \
            setpoints to current occupancy.",
        bounds: min_kwh(8_000.0),
        sizes: &[CompanySize::Large, CompanySize::Enterprise],
        cost_savings_factor: 0.12,
        co2_reduction_factor: 0.12,
        base_roi_months: 18,
        implementation_cost_factor: 1.5,
        base_priority: 0.65,
        ..BASE
    },
    RecommendationRule {
        id: "enterprise_energy_management",
        title: "Enterprise Energy Management System",
        description: "Implement comprehensive energy management software with real-time monitoring \
            and automated optimization.",
        difficulty: Difficulty::Hard,
        bounds: min_kwh(10_000.0),
        sizes: &[CompanySize::Enterprise],
        cost_savings_factor: 0.20,
        co2_reduction_factor: 0.20,
        base_roi_months: 24,
        implementation_cost_factor: 2.0,
        base_priority: 0.7,
        ..BASE
    },
    // Sustainability goals
    RecommendationRule {
        id: "solar_installation",
        title: "Solar Panel Installation",
        description: "Install rooftop or ground-mounted solar panels to generate clean renewable \
            energy and reduce grid dependence.",
        category: "Renewable Energy",
        difficulty: Difficulty::Hard,
        bounds: min_kwh(2_000.0),
        required_goals: &[GoalCategory::RenewableEnergy],
        cost_savings_factor: 0.30,
        co2_reduction_factor: 0.40,
        base_roi_months: 60,
        implementation_cost_factor: 4.0,
        base_priority: 0.9,
        ..BASE
    },
    RecommendationRule {
        id: "renewable_energy_procurement",
        title: "Renewable Energy Procurement",
        description: "Switch to a green tariff or purchase renewable energy certificates to cover \
            grid electricity use.",
        category: "Renewable Energy",
        bounds: min_kwh(1_000.0),
        required_goals: &[GoalCategory::RenewableEnergy, GoalCategory::CarbonReduction],
        cost_savings_factor: 0.02,
        co2_reduction_factor: 0.50,
        base_roi_months: 12,
        implementation_cost_factor: 0.5,
        base_priority: 0.75,
        ..BASE
    },
    RecommendationRule {
        id: "carbon_accounting_program",
        title: "Carbon Accounting and Reporting Program",
        description: "Establish a greenhouse gas inventory covering scope 1 and 2 emissions with \
            annual reduction targets.",
        category: "Carbon Reduction",
        required_goals: &[GoalCategory::CarbonReduction],
        cost_savings_factor: 0.03,
        co2_reduction_factor: 0.10,
        base_roi_months: 24,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "waste_reduction_program",
        title: "Comprehensive Waste Reduction Program",
        description: "Implement recycling programs, composting, and waste stream analysis to \
            minimize landfill waste.",
        category: "Waste Reduction",
        required_goals: &[GoalCategory::WasteReduction],
        cost_savings_factor: 0.05,
        co2_reduction_factor: 0.08,
        base_roi_months: 18,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "water_conservation_systems",
        title: "Water Conservation Systems",
        description: "Install low-flow fixtures, rainwater harvesting, and greywater recycling \
            systems to reduce water consumption.",
        category: "Water Conservation",
        required_goals: &[GoalCategory::WaterConservation],
        cost_savings_factor: 0.03,
        co2_reduction_factor: 0.02,
        base_roi_months: 30,
        base_priority: 0.5,
        ..BASE
    },
    RecommendationRule {
        id: "green_transportation",
        title: "Green Transportation Initiative",
        description: "Implement electric vehicle fleet, employee incentives for public transit, \
            and bike-sharing programs.",
        category: "Transportation",
        difficulty: Difficulty::Hard,
        sizes: ABOVE_SMALL,
        required_goals: &[GoalCategory::Transportation],
        cost_savings_factor: 0.10,
        co2_reduction_factor: 0.15,
        base_roi_months: 48,
        implementation_cost_factor: 2.5,
        base_priority: 0.6,
        ..BASE
    },
    RecommendationRule {
        id: "ev_charging_infrastructure",
        title: "Workplace EV Charging Stations",
        description: "Install Level 2 charging for staff and fleet vehicles, paired with managed \
            charging to avoid demand peaks.",
        category: "Transportation",
        bounds: min_kwh(1_000.0),
        sizes: ABOVE_SMALL,
        required_goals: &[GoalCategory::Transportation],
        cost_savings_factor: 0.02,
        co2_reduction_factor: 0.10,
        base_roi_months: 36,
        implementation_cost_factor: 3.0,
        base_priority: 0.5,
        ..BASE
    },
    RecommendationRule {
        id: "green_building_certification",
        title: "Green Building Certification",
        description: "Pursue LEED or ENERGY STAR certification to benchmark building performance \
            and guide capital upgrades.",
        category: "Green Building",
        difficulty: Difficulty::Hard,
        bounds: min_kwh(3_000.0),
        required_goals: &[GoalCategory::GreenBuilding],
        cost_savings_factor: 0.15,
        co2_reduction_factor: 0.15,
        base_roi_months: 48,
        implementation_cost_factor: 3.0,
        base_priority: 0.5,
        ..BASE
    },
    RecommendationRule {
        id: "sustainable_procurement_policy",
        title: "Sustainable Procurement Policy",
        description: "Adopt vendor sustainability criteria and prefer suppliers with verified \
            emissions and packaging commitments.",
        category: "Supply Chain",
        difficulty: Difficulty::Easy,
        required_goals: &[GoalCategory::SupplyChain],
        cost_savings_factor: 0.04,
        co2_reduction_factor: 0.06,
        base_roi_months: 12,
        base_priority: 0.55,
        ..BASE
    },
];
